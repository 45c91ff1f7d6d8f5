/// Lifecycle status of a Runtime.
///
/// A `StatusCell` only ever moves forward: Idle -> Running -> Disposed,
/// or Idle -> Disposed when a runtime is torn down before it started.

use std::fmt;
use crate::error::{Error, Result};

/// Operating window of a Runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Status {
    /// Created, subsystems may be registered, no frame activity yet
    #[default]
    Idle,
    /// Every registered subsystem initialized successfully
    Running,
    /// Registry drained. Terminal.
    Disposed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "Idle"),
            Status::Running => write!(f, "Running"),
            Status::Disposed => write!(f, "Disposed"),
        }
    }
}

/// Monotonic holder for a [`Status`]
#[derive(Debug, Default)]
pub struct StatusCell {
    status: Status,
}

impl StatusCell {
    /// Create a cell in the Idle state
    pub fn new() -> Self {
        Self { status: Status::Idle }
    }

    /// Current status
    pub fn get(&self) -> Status {
        self.status
    }

    /// Move to `next`
    ///
    /// Advancing to the current status is a no-op. Moving backwards
    /// (e.g. Disposed -> Idle) is rejected and leaves the cell unchanged.
    pub fn advance(&mut self, next: Status) -> Result<()> {
        if next < self.status {
            return Err(Error::InvalidState(format!(
                "status cannot move from {} back to {}", self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn is_disposed(&self) -> bool {
        self.status == Status::Disposed
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
