//! Frame event dispatch
//!
//! A broadcast bus that subsystems attach per-frame callbacks to.
//! The bus knows nothing about the registry: it only matches listeners
//! by event and owner identity.

mod frame_event;
mod event_bus;
mod subscription;

pub use frame_event::{FrameEvent, FrameTick};
pub use event_bus::{FrameEventBus, FrameCallback, ListenerKey};
pub use subscription::Subscription;
