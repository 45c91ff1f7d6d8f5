//! Error types for the Galaxy3D runtime
//!
//! This module defines the error types used by the subsystem registry,
//! the lifecycle driver, the frame event bus and the render backend contract.

use std::fmt;
use crate::event::FrameEvent;

/// Result type for Galaxy3D runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an [`Error`]
///
/// Used by hosts to decide whether a failure is a construction-order bug
/// (Configuration, Usage) or a runtime condition (Initialization, Disposal, Backend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Duplicate registration or lookup of a missing subsystem
    Configuration,
    /// A subsystem refused to initialize
    Initialization,
    /// Operation called in the wrong lifecycle window
    Usage,
    /// Recovered failure raised while tearing down
    Disposal,
    /// Rendering backend failure
    Backend,
}

/// Galaxy3D runtime errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A subsystem of this type is already registered
    AlreadyRegistered(&'static str),

    /// No subsystem of this type is registered
    NotRegistered(&'static str),

    /// A subsystem's initialize() failed
    InitializationFailed {
        subsystem: &'static str,
        reason: String,
    },

    /// A subsystem's dispose() failed (recovered, never propagated)
    DisposeFailed {
        subsystem: &'static str,
        reason: String,
    },

    /// A listener outlived the subsystem that registered it
    DanglingListener {
        event: FrameEvent,
        owner: &'static str,
    },

    /// Operation not permitted in the current lifecycle state
    InvalidState(String),

    /// Backend-specific error
    BackendError(String),

    /// Invalid or stale resource handle
    InvalidResource(String),
}

impl Error {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AlreadyRegistered(_) | Error::NotRegistered(_) => ErrorKind::Configuration,
            Error::InitializationFailed { .. } => ErrorKind::Initialization,
            Error::InvalidState(_) => ErrorKind::Usage,
            Error::DisposeFailed { .. } | Error::DanglingListener { .. } => ErrorKind::Disposal,
            Error::BackendError(_) | Error::InvalidResource(_) => ErrorKind::Backend,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AlreadyRegistered(name) => write!(f, "Subsystem already registered: {}", name),
            Error::NotRegistered(name) => write!(f, "Subsystem not registered: {}", name),
            Error::InitializationFailed { subsystem, reason } => {
                write!(f, "Initialization failed: {}: {}", subsystem, reason)
            }
            Error::DisposeFailed { subsystem, reason } => {
                write!(f, "Dispose failed: {}: {}", subsystem, reason)
            }
            Error::DanglingListener { event, owner } => {
                write!(f, "Dangling listener: '{}' still subscribed to {}", owner, event)
            }
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
