/// Scoped listener registration.
///
/// A `Subscription` is returned by `FrameEventBus::subscribe` and removes its
/// listener when dropped, so a subsystem that stores its subscriptions as
/// fields cannot leave a listener behind once it is disposed or dropped.

use std::cell::RefCell;
use std::rc::Weak;

use crate::subsystem::SubsystemHandle;
use super::event_bus::{ListenerKey, Listeners};
use super::frame_event::FrameEvent;

/// Owned handle to one listener on a FrameEventBus
#[must_use = "dropping a Subscription removes its listener immediately"]
pub struct Subscription {
    bus: Weak<RefCell<Listeners>>,
    key: Option<ListenerKey>,
    event: FrameEvent,
    owner: SubsystemHandle,
}

impl Subscription {
    pub(crate) fn active(
        bus: Weak<RefCell<Listeners>>,
        key: ListenerKey,
        event: FrameEvent,
        owner: SubsystemHandle,
    ) -> Self {
        Self { bus, key: Some(key), event, owner }
    }

    /// Subscription returned for a duplicate (event, owner) pair
    pub(crate) fn inactive(event: FrameEvent, owner: SubsystemHandle) -> Self {
        Self { bus: Weak::new(), key: None, event, owner }
    }

    pub fn event(&self) -> FrameEvent {
        self.event
    }

    pub fn owner(&self) -> SubsystemHandle {
        self.owner
    }

    /// Whether the listener is still registered on a live bus
    ///
    /// Becomes false after `FrameEventBus::unsubscribe` or `clear` removed the
    /// listener, or once the bus itself is gone.
    pub fn is_active(&self) -> bool {
        match (self.key, self.bus.upgrade()) {
            (Some(key), Some(bus)) => bus.borrow().contains(key),
            _ => false,
        }
    }

    /// Remove the listener now
    ///
    /// Returns whether a listener was actually removed.
    pub fn cancel(mut self) -> bool {
        self.release()
    }

    /// Give up ownership without removing the listener
    ///
    /// The listener then stays until `FrameEventBus::unsubscribe` is called
    /// for this (event, owner) pair.
    pub fn detach(mut self) {
        self.key = None;
    }

    fn release(&mut self) -> bool {
        let Some(key) = self.key.take() else {
            return false;
        };
        let Some(bus) = self.bus.upgrade() else {
            return false;
        };

        let removed = match bus.try_borrow_mut() {
            Ok(mut listeners) => listeners.remove(key),
            Err(_) => {
                crate::runtime_error!("galaxy3d::EventBus",
                    "Cannot release listener of '{}' on {}: bus is busy",
                    self.owner.name(), self.event);
                None
            }
        };
        removed.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("owner", &self.owner.name())
            .field("active", &self.is_active())
            .finish()
    }
}
