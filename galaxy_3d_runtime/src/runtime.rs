/// Galaxy3D Runtime - lifecycle driver for engine subsystems
///
/// A `Runtime` owns the subsystem registry, the frame event bus and the
/// lifecycle status. It is an explicit context object handed to whatever
/// owns the main loop; several independent runtimes may coexist.
///
/// The runtime is single-threaded (`!Send`): registration, ticking and
/// teardown happen on the thread that created it.

use crate::config::RuntimeConfig;
use crate::error::{Error, Result};
use crate::event::{FrameEvent, FrameEventBus, FrameTick};
use crate::runtime_bail;
use crate::status::{Status, StatusCell};
use crate::subsystem::{DisposeReport, Subsystem, SubsystemHandle, SubsystemRegistry};

const SOURCE: &str = "galaxy3d::Runtime";

/// Lifecycle driver
///
/// `Idle --initialize(ok)--> Running --dispose--> Disposed`.
/// A failed `initialize` leaves the runtime Idle. Disposed is terminal.
///
/// # Example
///
/// ```
/// use galaxy_3d_runtime::galaxy3d::{Runtime, Status};
/// use galaxy_3d_runtime::galaxy3d::backend::{HeadlessBackend, shared_backend};
/// use galaxy_3d_runtime::galaxy3d::subsystems::{DebugDraw, RendererSubsystem};
///
/// let backend = shared_backend(HeadlessBackend::new());
///
/// let mut runtime = Runtime::default();
/// runtime.add(RendererSubsystem::new(backend.clone()))?;
/// runtime.add(DebugDraw::new(backend.clone()))?;
/// runtime.initialize()?;
/// assert_eq!(runtime.status(), Status::Running);
///
/// runtime.tick(0.016)?;
///
/// let report = runtime.dispose();
/// assert_eq!(report.disposed, vec!["DebugDraw", "RendererSubsystem"]);
/// assert_eq!(runtime.status(), Status::Disposed);
/// # Ok::<(), galaxy_3d_runtime::galaxy3d::Error>(())
/// ```
pub struct Runtime {
    config: RuntimeConfig,
    status: StatusCell,
    registry: Option<SubsystemRegistry>,
    bus: FrameEventBus,
    frame: u64,
}

impl Runtime {
    /// Create an Idle runtime
    ///
    /// The registry is constructed lazily, on the first `add` or `initialize`.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            status: StatusCell::new(),
            registry: None,
            bus: FrameEventBus::new(),
            frame: 0,
        }
    }

    // ===== LIFECYCLE =====

    /// Current lifecycle status
    pub fn status(&self) -> Status {
        self.status.get()
    }

    /// Initialize every registered subsystem and enter Running
    ///
    /// Idempotent while Running. On failure the subsystems already
    /// initialized are disposed in reverse order, listeners left by the
    /// failing subsystem are removed and the runtime stays Idle; a later call
    /// retries from the first uninitialized subsystem. What the unwind
    /// recovered is listed by [`Runtime::pending_recovered`] and reported by
    /// `dispose`.
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` naming the subsystem that failed.
    ///
    /// # Panics
    ///
    /// Panics if the runtime was disposed: a disposed runtime cannot be restarted.
    pub fn initialize(&mut self) -> Result<()> {
        match self.status.get() {
            Status::Disposed => panic!(
                "Runtime '{}': initialize() called after dispose()", self.config.name
            ),
            Status::Running => return Ok(()),
            Status::Idle => {}
        }

        let registry = self.registry.get_or_insert_with(SubsystemRegistry::new);
        registry.initialize_all(&self.bus)?;
        let count = registry.len();

        self.status.advance(Status::Running)?;
        for (event, owner) in self.bus.listeners() {
            if event == FrameEvent::FrameEnd {
                self.warn_unpublished(owner);
            }
        }

        crate::runtime_info!(SOURCE,
            "Runtime '{}' running with {} subsystem(s)", self.config.name, count);
        Ok(())
    }

    /// Errors recovered by failed initializations, not yet reported by `dispose`
    pub fn pending_recovered(&self) -> &[Error] {
        match self.registry.as_ref() {
            Some(registry) => registry.pending_recovered(),
            None => &[],
        }
    }

    /// Tear down every subsystem, last registered first, and enter Disposed
    ///
    /// Safe to call in any state: calling it on a disposed runtime does
    /// nothing. Listeners still attached once every subsystem is disposed
    /// are reported as `DanglingListener` and removed.
    pub fn dispose(&mut self) -> DisposeReport {
        if self.status.is_disposed() {
            crate::runtime_debug!(SOURCE,
                "Runtime '{}' already disposed, ignoring", self.config.name);
            return DisposeReport::default();
        }

        let mut report = match self.registry.take() {
            Some(mut registry) => registry.dispose_all(),
            None => DisposeReport::default(),
        };

        for (event, owner) in self.bus.clear() {
            let err = crate::runtime_err!(SOURCE, Error::DanglingListener { event, owner });
            report.recovered.push(err);
        }

        // Forward-only: Idle or Running -> Disposed cannot be rejected
        let _ = self.status.advance(Status::Disposed);

        if report.is_clean() {
            crate::runtime_info!(SOURCE,
                "Runtime '{}' disposed ({} subsystem(s))",
                self.config.name, report.disposed.len());
        } else {
            crate::runtime_warn!(SOURCE,
                "Runtime '{}' disposed with {} recovered error(s)",
                self.config.name, report.recovered.len());
        }
        report
    }

    // ===== SUBSYSTEMS =====

    /// Register a subsystem
    ///
    /// On a Running runtime the subsystem is initialized immediately; if that
    /// fails it is removed again, along with any listener it attached, and
    /// the error is returned.
    ///
    /// # Errors
    ///
    /// - `AlreadyRegistered` if a subsystem of type `T` exists
    /// - `InitializationFailed` for a late registration that failed
    /// - `InvalidState` if the runtime is disposed
    pub fn add<T: Subsystem>(&mut self, subsystem: T) -> Result<&mut T> {
        if self.status.is_disposed() {
            runtime_bail!(SOURCE, Error::InvalidState(format!(
                "cannot add '{}' to a disposed runtime", SubsystemHandle::of::<T>().name()
            )));
        }

        let running = self.status.is_running();
        let registry = self.registry.get_or_insert_with(SubsystemRegistry::new);
        registry.add(subsystem)?;

        if running {
            if let Err(err) = registry.initialize_one::<T>(&self.bus) {
                // Never initialized, so removal does not call dispose
                let _ = registry.remove::<T>();
                return Err(err);
            }
            let handle = SubsystemHandle::of::<T>();
            if self.bus.is_subscribed(FrameEvent::FrameEnd, handle) {
                self.warn_unpublished(handle.name());
            }
        }

        self.try_get_mut::<T>()
    }

    /// Dispose and unregister the subsystem `T`
    ///
    /// Listeners `T` left on the bus are reported and removed.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `T` is absent.
    pub fn remove<T: Subsystem>(&mut self) -> Result<DisposeReport> {
        let handle = SubsystemHandle::of::<T>();
        let Some(registry) = self.registry.as_mut() else {
            runtime_bail!(SOURCE, Error::NotRegistered(handle.name()));
        };

        let mut report = registry.remove::<T>()?;

        for event in FrameEvent::ALL {
            if self.bus.unsubscribe(event, handle) {
                let err = crate::runtime_err!(SOURCE,
                    Error::DanglingListener { event, owner: handle.name() });
                report.recovered.push(err);
            }
        }
        Ok(report)
    }

    pub fn contains<T: Subsystem>(&self) -> bool {
        self.registry.as_ref().is_some_and(|registry| registry.contains::<T>())
    }

    /// Get the subsystem `T`
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `T` is absent (including after dispose).
    pub fn try_get<T: Subsystem>(&self) -> Result<&T> {
        match self.registry.as_ref() {
            Some(registry) => registry.try_get::<T>(),
            None => Err(Error::NotRegistered(SubsystemHandle::of::<T>().name())),
        }
    }

    /// Get the subsystem `T` mutably
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `T` is absent.
    pub fn try_get_mut<T: Subsystem>(&mut self) -> Result<&mut T> {
        match self.registry.as_mut() {
            Some(registry) => registry.try_get_mut::<T>(),
            None => Err(Error::NotRegistered(SubsystemHandle::of::<T>().name())),
        }
    }

    /// Get the subsystem `T`
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    pub fn get<T: Subsystem>(&self) -> &T {
        match self.try_get::<T>() {
            Ok(subsystem) => subsystem,
            Err(err) => panic!("{}", err),
        }
    }

    /// Get the subsystem `T` mutably
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    pub fn get_mut<T: Subsystem>(&mut self) -> &mut T {
        match self.try_get_mut::<T>() {
            Ok(subsystem) => subsystem,
            Err(err) => panic!("{}", err),
        }
    }

    /// Registered subsystem names, in registration order
    pub fn subsystem_names(&self) -> Vec<&'static str> {
        self.registry.as_ref().map(SubsystemRegistry::names).unwrap_or_default()
    }

    pub fn subsystem_count(&self) -> usize {
        self.registry.as_ref().map_or(0, SubsystemRegistry::len)
    }

    // ===== FRAMES =====

    /// Frame event bus shared with the subsystems
    pub fn bus(&self) -> &FrameEventBus {
        &self.bus
    }

    /// Run one frame: publish FrameBegin, FrameRender, then FrameEnd
    ///
    /// `delta_seconds` is clamped according to the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the runtime is Running.
    pub fn tick(&mut self, delta_seconds: f32) -> Result<FrameTick> {
        if !self.status.is_running() {
            runtime_bail!(SOURCE, Error::InvalidState(format!(
                "tick() requires a running runtime (status: {})", self.status.get()
            )));
        }

        let tick = FrameTick::new(self.frame, self.config.clamp_delta(delta_seconds));
        self.frame += 1;

        let mut invoked = self.bus.publish(FrameEvent::FrameBegin, &tick);
        invoked += self.bus.publish(FrameEvent::FrameRender, &tick);
        if self.config.publish_frame_end {
            invoked += self.bus.publish(FrameEvent::FrameEnd, &tick);
        }

        if self.config.trace_frames {
            crate::runtime_trace!(SOURCE,
                "Frame {} ({:.4}s): {} callback(s)", tick.frame, tick.delta_seconds, invoked);
        }
        Ok(tick)
    }

    /// Warn that the FrameEnd listener of `owner` will never be called
    fn warn_unpublished(&self, owner: &str) {
        if self.config.publish_frame_end {
            return;
        }
        crate::runtime_warn!(SOURCE,
            "'{}' listens to {} but publish_frame_end is disabled on runtime '{}'",
            owner, FrameEvent::FrameEnd, self.config.name);
    }

    /// Number of ticks run so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if !self.status.is_disposed() {
            self.dispose();
        }
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
