//! Integration tests for runtime logging
//!
//! These tests verify that lifecycle transitions and recovered teardown
//! errors reach a custom logger.
//!
//! Run with: cargo test --test logging_integration_tests

use galaxy_3d_runtime::galaxy3d::event::{FrameEvent, FrameEventBus};
use galaxy_3d_runtime::galaxy3d::log::{self, LogEntry, LogSeverity, Logger};
use galaxy_3d_runtime::galaxy3d::subsystem::{Subsystem, SubsystemHandle};
use galaxy_3d_runtime::galaxy3d::subsystems::Picking;
use galaxy_3d_runtime::galaxy3d::{Error, Result, Runtime, RuntimeConfig};
use serial_test::serial;
use std::sync::{Arc, Mutex};

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn install() -> Arc<Mutex<Vec<LogEntry>>> {
        let entries = Arc::new(Mutex::new(Vec::new()));
        log::set_logger(Self { entries: entries.clone() });
        entries
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn find<'a>(entries: &'a [LogEntry], severity: LogSeverity, needle: &str) -> Option<&'a LogEntry> {
    entries
        .iter()
        .find(|entry| entry.severity == severity && entry.message.contains(needle))
}

// ============================================================================
// TEST SUBSYSTEMS
// ============================================================================

/// Dispose always fails
struct Faulty;

impl Subsystem for Faulty {
    fn initialize(&mut self, _bus: &FrameEventBus) -> Result<()> {
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        Err(Error::BackendError("device lost".to_string()))
    }
}

/// Never releases its listener
struct Leaky;

impl Subsystem for Leaky {
    fn initialize(&mut self, bus: &FrameEventBus) -> Result<()> {
        bus.subscribe(FrameEvent::FrameRender, SubsystemHandle::of::<Self>(), |_| {}).detach();
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        Ok(())
    }
}

struct Quiet;

impl Subsystem for Quiet {
    fn initialize(&mut self, _bus: &FrameEventBus) -> Result<()> {
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let entries = TestLogger::install();

    log::log(LogSeverity::Info, "test::module", "Test info message".to_string());
    log::log_detailed(LogSeverity::Error, "test::module", "Test error message".to_string(), "lib.rs", 7);

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].severity, LogSeverity::Info);
        assert_eq!(captured[0].source, "test::module");
        assert_eq!(captured[0].file, None);
        assert_eq!(captured[1].severity, LogSeverity::Error);
        assert_eq!(captured[1].file, Some("lib.rs"));
        assert_eq!(captured[1].line, Some(7));
    }

    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_lifecycle_is_logged() {
    let entries = TestLogger::install();

    let mut runtime = Runtime::new(RuntimeConfig {
        name: "logged".to_string(),
        ..RuntimeConfig::default()
    });
    runtime.add(Quiet).unwrap();
    runtime.initialize().unwrap();
    runtime.dispose();

    {
        let captured = entries.lock().unwrap();
        let running = find(&captured, LogSeverity::Info, "Runtime 'logged' running with 1 subsystem(s)");
        assert_eq!(running.map(|entry| entry.source.as_str()), Some("galaxy3d::Runtime"));
        assert!(find(&captured, LogSeverity::Info, "Runtime 'logged' disposed").is_some());
        assert!(captured.iter().all(|entry| entry.severity != LogSeverity::Error));
    }

    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_dispose_failure_is_logged_and_reported() {
    let entries = TestLogger::install();

    let mut runtime = Runtime::default();
    runtime.add(Quiet).unwrap();
    runtime.add(Faulty).unwrap();
    runtime.initialize().unwrap();
    let report = runtime.dispose();

    // Teardown continued past the failure
    assert_eq!(report.disposed, vec!["Faulty", "Quiet"]);
    assert_eq!(
        report.recovered,
        vec![Error::DisposeFailed {
            subsystem: "Faulty",
            reason: "Backend error: device lost".to_string(),
        }]
    );

    {
        let captured = entries.lock().unwrap();
        let logged = find(&captured, LogSeverity::Error, "Dispose failed: Faulty").unwrap();
        assert_eq!(logged.source, "galaxy3d::Registry");
        assert!(logged.file.is_some());
        assert!(find(&captured, LogSeverity::Warn, "1 recovered error(s)").is_some());
    }

    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_dangling_listener_is_logged_and_purged() {
    let entries = TestLogger::install();

    let mut runtime = Runtime::default();
    runtime.add(Leaky).unwrap();
    runtime.initialize().unwrap();
    let report = runtime.dispose();

    assert_eq!(
        report.recovered,
        vec![Error::DanglingListener { event: FrameEvent::FrameRender, owner: "Leaky" }]
    );
    assert!(runtime.bus().is_empty());

    {
        let captured = entries.lock().unwrap();
        let logged = find(&captured, LogSeverity::Error, "Dangling listener: 'Leaky'").unwrap();
        assert_eq!(logged.source, "galaxy3d::Runtime");
    }

    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_frame_end_listener_warns_when_frame_end_disabled() {
    let entries = TestLogger::install();

    let mut runtime = Runtime::new(RuntimeConfig {
        name: "no-end".to_string(),
        publish_frame_end: false,
        ..RuntimeConfig::default()
    });
    runtime.add(Picking::default()).unwrap();
    runtime.initialize().unwrap();

    {
        let captured = entries.lock().unwrap();
        let logged = find(
            &captured,
            LogSeverity::Warn,
            "'Picking' listens to frame-end but publish_frame_end is disabled on runtime 'no-end'",
        )
        .unwrap();
        assert_eq!(logged.source, "galaxy3d::Runtime");
    }

    runtime.dispose();
    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_late_frame_end_listener_warns_when_frame_end_disabled() {
    let entries = TestLogger::install();

    let mut runtime = Runtime::new(RuntimeConfig {
        publish_frame_end: false,
        ..RuntimeConfig::default()
    });
    runtime.initialize().unwrap();
    runtime.add(Picking::default()).unwrap();

    {
        let captured = entries.lock().unwrap();
        assert!(find(&captured, LogSeverity::Warn, "'Picking' listens to frame-end").is_some());
    }

    runtime.dispose();
    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_frame_end_listener_is_silent_by_default() {
    let entries = TestLogger::install();

    let mut runtime = Runtime::default();
    runtime.add(Picking::default()).unwrap();
    runtime.initialize().unwrap();
    runtime.dispose();

    {
        let captured = entries.lock().unwrap();
        assert!(find(&captured, LogSeverity::Warn, "listens to frame-end").is_none());
    }

    log::reset_logger();
}
