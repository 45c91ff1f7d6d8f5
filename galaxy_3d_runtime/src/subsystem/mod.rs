//! Subsystem contract and registry
//!
//! Every engine facility (renderer, camera update, debug draw, picking...)
//! is a `Subsystem` owned by a `SubsystemRegistry`. The registry keeps one
//! instance per type and tears them down in reverse registration order.

mod subsystem;
mod registry;

pub use subsystem::{AsAny, Subsystem, SubsystemHandle, SubsystemState};
pub use registry::{DisposeReport, SubsystemRegistry};
