/// Frame event bus.
///
/// Holds, per frame event, an ordered list of listeners. Each listener is
/// identified by its owner (a subsystem handle); an owner is subscribed to a
/// given event at most once.
///
/// The bus is a cheap-to-clone handle over shared state. It is deliberately
/// `!Send`: registration, removal and publication all happen on the thread
/// that owns the Runtime.

use std::cell::RefCell;
use std::rc::Rc;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::subsystem::SubsystemHandle;
use super::frame_event::{FrameEvent, FrameTick};
use super::subscription::Subscription;

new_key_type! {
    /// Stable identifier of one registered listener
    pub struct ListenerKey;
}

/// Callback invoked on publication
pub type FrameCallback = Rc<dyn Fn(&FrameTick)>;

pub(crate) struct Listener {
    event: FrameEvent,
    owner: SubsystemHandle,
    callback: FrameCallback,
}

/// Shared listener storage
#[derive(Default)]
pub(crate) struct Listeners {
    entries: SlotMap<ListenerKey, Listener>,
    order: FxHashMap<FrameEvent, Vec<ListenerKey>>,
}

impl Listeners {
    fn find(&self, event: FrameEvent, owner: SubsystemHandle) -> Option<ListenerKey> {
        self.order.get(&event)?.iter().copied().find(|key| {
            self.entries.get(*key).is_some_and(|listener| listener.owner == owner)
        })
    }

    pub(crate) fn contains(&self, key: ListenerKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove one listener
    ///
    /// The removed listener is handed back so the caller can drop it once the
    /// storage borrow is released (its callback may own arbitrary state).
    pub(crate) fn remove(&mut self, key: ListenerKey) -> Option<Listener> {
        let listener = self.entries.remove(key)?;
        if let Some(keys) = self.order.get_mut(&listener.event) {
            keys.retain(|k| *k != key);
        }
        Some(listener)
    }
}

/// Broadcast bus for per-frame events
///
/// # Example
///
/// ```
/// use galaxy_3d_runtime::galaxy3d::event::{FrameEvent, FrameEventBus, FrameTick};
/// use galaxy_3d_runtime::galaxy3d::subsystem::SubsystemHandle;
///
/// struct Hud;
///
/// let bus = FrameEventBus::new();
/// let subscription = bus.subscribe(
///     FrameEvent::FrameRender,
///     SubsystemHandle::of::<Hud>(),
///     |tick: &FrameTick| println!("frame {}", tick.frame),
/// );
/// assert_eq!(bus.publish(FrameEvent::FrameRender, &FrameTick::new(0, 0.016)), 1);
///
/// drop(subscription);
/// assert_eq!(bus.publish(FrameEvent::FrameRender, &FrameTick::new(1, 0.016)), 0);
/// ```
#[derive(Clone, Default)]
pub struct FrameEventBus {
    inner: Rc<RefCell<Listeners>>,
}

impl FrameEventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `callback` to `event` on behalf of `owner`
    ///
    /// If `owner` is already subscribed to `event`, nothing is registered and
    /// the returned subscription is inactive. Dropping an active subscription
    /// removes the listener.
    pub fn subscribe<F>(&self, event: FrameEvent, owner: SubsystemHandle, callback: F) -> Subscription
    where
        F: Fn(&FrameTick) + 'static,
    {
        let mut inner = self.inner.borrow_mut();

        if inner.find(event, owner).is_some() {
            crate::runtime_debug!("galaxy3d::EventBus",
                "'{}' is already subscribed to {}, ignoring", owner.name(), event);
            return Subscription::inactive(event, owner);
        }

        let key = inner.entries.insert(Listener {
            event,
            owner,
            callback: Rc::new(callback),
        });
        inner.order.entry(event).or_default().push(key);

        crate::runtime_trace!("galaxy3d::EventBus", "'{}' subscribed to {}", owner.name(), event);

        Subscription::active(Rc::downgrade(&self.inner), key, event, owner)
    }

    /// Remove the listener `owner` registered on `event`
    ///
    /// Returns whether a listener was removed. Unknown owners are a no-op.
    pub fn unsubscribe(&self, event: FrameEvent, owner: SubsystemHandle) -> bool {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            inner.find(event, owner).and_then(|key| inner.remove(key))
        };
        removed.is_some()
    }

    /// Remove every listener registered by `owner`, on any event
    pub fn unsubscribe_owner(&self, owner: SubsystemHandle) -> usize {
        let removed: Vec<Listener> = {
            let mut inner = self.inner.borrow_mut();
            let keys: Vec<ListenerKey> = inner
                .entries
                .iter()
                .filter(|(_, listener)| listener.owner == owner)
                .map(|(key, _)| key)
                .collect();
            keys.into_iter().filter_map(|key| inner.remove(key)).collect()
        };
        removed.len()
    }

    /// Invoke every listener of `event`, in registration order
    ///
    /// The listener list is snapshotted before the first call. Listeners
    /// removed by an earlier callback are skipped; listeners added during the
    /// publication are first called on the next publish. Returns the number
    /// of callbacks invoked.
    pub fn publish(&self, event: FrameEvent, tick: &FrameTick) -> usize {
        let snapshot: Vec<(ListenerKey, FrameCallback)> = {
            let inner = self.inner.borrow();
            match inner.order.get(&event) {
                Some(keys) => keys
                    .iter()
                    .filter_map(|key| inner.entries.get(*key).map(|l| (*key, l.callback.clone())))
                    .collect(),
                None => Vec::new(),
            }
        };

        let mut invoked = 0;
        for (key, callback) in snapshot {
            if !self.inner.borrow().contains(key) {
                continue;
            }
            callback(tick);
            invoked += 1;
        }
        invoked
    }

    /// Whether `owner` listens to `event`
    pub fn is_subscribed(&self, event: FrameEvent, owner: SubsystemHandle) -> bool {
        self.inner.borrow().find(event, owner).is_some()
    }

    /// Number of listeners attached to `event`
    pub fn listener_count(&self, event: FrameEvent) -> usize {
        self.inner.borrow().order.get(&event).map_or(0, Vec::len)
    }

    /// Number of listeners across every event
    pub fn total_listeners(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_listeners() == 0
    }

    /// (event, owner name) of every listener, in publication then registration order
    pub fn listeners(&self) -> Vec<(FrameEvent, &'static str)> {
        let inner = self.inner.borrow();
        let mut listeners = Vec::with_capacity(inner.entries.len());
        for event in FrameEvent::ALL {
            let Some(keys) = inner.order.get(&event) else {
                continue;
            };
            for listener in keys.iter().filter_map(|key| inner.entries.get(*key)) {
                listeners.push((listener.event, listener.owner.name()));
            }
        }
        listeners
    }

    /// Remove every listener, returning what was still attached
    pub fn clear(&self) -> Vec<(FrameEvent, &'static str)> {
        let remaining = self.listeners();
        // Removed in place: keys held by outstanding subscriptions stay stale
        let drained: Vec<Listener> = {
            let mut inner = self.inner.borrow_mut();
            let keys: Vec<ListenerKey> = inner.entries.keys().collect();
            keys.into_iter().filter_map(|key| inner.remove(key)).collect()
        };
        drop(drained);
        remaining
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
