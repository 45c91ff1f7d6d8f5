/// Subsystem registry.
///
/// Stores at most one instance per subsystem type together with the order
/// in which they were registered. The order is kept as a stack: registration
/// pushes, teardown pops, so the last-registered subsystem is always the
/// first one disposed.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::event::{FrameEvent, FrameEventBus};
use crate::runtime_bail;
use super::subsystem::{Subsystem, SubsystemHandle, SubsystemState};

struct Slot {
    subsystem: Box<dyn Subsystem>,
    state: SubsystemState,
}

/// Outcome of a teardown
///
/// Teardown never fails: failures are collected here (and logged) so the
/// caller can surface them without the drain being interrupted.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DisposeReport {
    /// Names of subsystems whose `dispose` was called, in call order
    pub disposed: Vec<&'static str>,
    /// Errors recovered while tearing down
    pub recovered: Vec<Error>,
}

impl DisposeReport {
    /// Whether teardown completed without any recovered error
    pub fn is_clean(&self) -> bool {
        self.recovered.is_empty()
    }

    /// Append another report
    pub fn merge(&mut self, other: DisposeReport) {
        self.disposed.extend(other.disposed);
        self.recovered.extend(other.recovered);
    }
}

/// Keyed store of subsystem instances
///
/// Invariant: `order` is always a permutation of the keys of `slots`.
#[derive(Default)]
pub struct SubsystemRegistry {
    slots: FxHashMap<SubsystemHandle, Slot>,
    order: Vec<SubsystemHandle>,
    /// Errors recovered while unwinding failed initializations, reported by
    /// the next `dispose_all`
    pending: Vec<Error>,
}

impl SubsystemRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    // ===== REGISTRATION =====

    /// Register `subsystem` under its type
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRegistered` if a subsystem of type `T` is present.
    /// The registry is left unchanged.
    pub fn add<T: Subsystem>(&mut self, subsystem: T) -> Result<&mut T> {
        let handle = SubsystemHandle::of::<T>();
        if self.slots.contains_key(&handle) {
            runtime_bail!("galaxy3d::Registry", Error::AlreadyRegistered(handle.name()));
        }

        self.slots.insert(handle, Slot {
            subsystem: Box::new(subsystem),
            state: SubsystemState::Registered,
        });
        self.order.push(handle);

        crate::runtime_debug!("galaxy3d::Registry",
            "Registered '{}' ({} subsystems)", handle.name(), self.order.len());

        self.try_get_mut::<T>()
    }

    /// Construct `T` with `Default` and register it
    pub fn add_default<T: Subsystem + Default>(&mut self) -> Result<&mut T> {
        self.add(T::default())
    }

    // ===== LOOKUP =====

    pub fn contains<T: Subsystem>(&self) -> bool {
        self.slots.contains_key(&SubsystemHandle::of::<T>())
    }

    /// Lifecycle state of `T`, if registered
    pub fn state<T: Subsystem>(&self) -> Option<SubsystemState> {
        self.slots.get(&SubsystemHandle::of::<T>()).map(|slot| slot.state)
    }

    pub fn is_initialized<T: Subsystem>(&self) -> bool {
        self.state::<T>() == Some(SubsystemState::Initialized)
    }

    /// Get the instance of `T`
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if no subsystem of type `T` is present.
    pub fn try_get<T: Subsystem>(&self) -> Result<&T> {
        let handle = SubsystemHandle::of::<T>();
        self.slots
            .get(&handle)
            .and_then(|slot| (*slot.subsystem).as_any().downcast_ref::<T>())
            .ok_or(Error::NotRegistered(handle.name()))
    }

    /// Get the instance of `T` mutably
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if no subsystem of type `T` is present.
    pub fn try_get_mut<T: Subsystem>(&mut self) -> Result<&mut T> {
        let handle = SubsystemHandle::of::<T>();
        self.slots
            .get_mut(&handle)
            .and_then(|slot| (*slot.subsystem).as_any_mut().downcast_mut::<T>())
            .ok_or(Error::NotRegistered(handle.name()))
    }

    /// Get the instance of `T`
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered: asking for a subsystem that was never
    /// added is a construction-order bug. Use `try_get` to check first.
    pub fn get<T: Subsystem>(&self) -> &T {
        match self.try_get::<T>() {
            Ok(subsystem) => subsystem,
            Err(err) => panic!("{}", err),
        }
    }

    /// Get the instance of `T` mutably
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

    /// Number of registered subsystems
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered subsystem names, in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.order
            .iter()
            .filter_map(|handle| self.slots.get(handle))
            .map(|slot| slot.subsystem.name())
            .collect()
    }

    /// Registered handles, in registration order
    pub fn handles(&self) -> &[SubsystemHandle] {
        &self.order
    }

    /// Errors recovered by failed initializations, not yet reported
    pub fn pending_recovered(&self) -> &[Error] {
        &self.pending
    }

    // ===== INITIALIZATION =====

    /// Initialize every registered subsystem, in registration order
    ///
    /// Subsystems already initialized are skipped. On the first failure,
    /// the subsystems initialized by this call are disposed in reverse order
    /// and put back to `Registered`; subsystems after the failing one are
    /// never touched. Listeners the failing subsystem (or an unwound one)
    /// left on `bus` are removed. Dispose errors and removed listeners are
    /// kept as recovered errors until the next `dispose_all`.
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` naming the failing subsystem.
    pub fn initialize_all(&mut self, bus: &FrameEventBus) -> Result<()> {
        let mut initialized: Vec<SubsystemHandle> = Vec::new();

        for handle in self.order.clone() {
            let Some(slot) = self.slots.get_mut(&handle) else {
                continue;
            };
            if slot.state == SubsystemState::Initialized {
                continue;
            }

            match Self::initialize_slot(slot, bus) {
                Ok(()) => initialized.push(handle),
                Err(err) => {
                    crate::runtime_warn!("galaxy3d::Registry",
                        "Unwinding {} subsystem(s) initialized before '{}'",
                        initialized.len(), handle.name());

                    self.purge_listeners(bus, handle);
                    while let Some(done) = initialized.pop() {
                        if let Some(slot) = self.slots.get_mut(&done) {
                            if let Err(recovered) = Self::dispose_slot(slot) {
                                self.pending.push(recovered);
                            }
                        }
                        self.purge_listeners(bus, done);
                    }
                    return Err(err);
                }
            }
        }

        crate::runtime_debug!("galaxy3d::Registry",
            "Initialized {} subsystem(s)", initialized.len());
        Ok(())
    }

    /// Initialize the single subsystem `T`
    ///
    /// No-op if it is already initialized. On failure, listeners `T`
    /// attached before failing are removed and kept as recovered errors.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `T` is absent, or the subsystem's
    /// `InitializationFailed` error.
    pub fn initialize_one<T: Subsystem>(&mut self, bus: &FrameEventBus) -> Result<()> {
        let handle = SubsystemHandle::of::<T>();
        let Some(slot) = self.slots.get_mut(&handle) else {
            runtime_bail!("galaxy3d::Registry", Error::NotRegistered(handle.name()));
        };
        if slot.state == SubsystemState::Initialized {
            return Ok(());
        }

        let result = Self::initialize_slot(slot, bus);
        if result.is_err() {
            self.purge_listeners(bus, handle);
        }
        result
    }

    /// Remove whatever `handle` still has attached to `bus`
    fn purge_listeners(&mut self, bus: &FrameEventBus, handle: SubsystemHandle) {
        for event in FrameEvent::ALL {
            if bus.unsubscribe(event, handle) {
                let err = crate::runtime_err!("galaxy3d::Registry",
                    Error::DanglingListener { event, owner: handle.name() });
                self.pending.push(err);
            }
        }
    }

    fn initialize_slot(slot: &mut Slot, bus: &FrameEventBus) -> Result<()> {
        let name = slot.subsystem.name();
        match slot.subsystem.initialize(bus) {
            Ok(()) => {
                slot.state = SubsystemState::Initialized;
                crate::runtime_debug!("galaxy3d::Registry", "Initialized '{}'", name);
                Ok(())
            }
            Err(err) => {
                let err = match err {
                    Error::InitializationFailed { .. } => err,
                    other => Error::InitializationFailed {
                        subsystem: name,
                        reason: other.to_string(),
                    },
                };
                Err(crate::runtime_err!("galaxy3d::Registry", err))
            }
        }
    }

    // ===== TEARDOWN =====

    /// Dispose (if initialized) and erase the subsystem `T`
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if `T` is absent. A failing `dispose` is not
    /// an error here: it is recorded in the returned report.
    pub fn remove<T: Subsystem>(&mut self) -> Result<DisposeReport> {
        let handle = SubsystemHandle::of::<T>();
        let Some(mut slot) = self.slots.remove(&handle) else {
            runtime_bail!("galaxy3d::Registry", Error::NotRegistered(handle.name()));
        };
        self.order.retain(|h| *h != handle);

        let mut report = DisposeReport::default();
        Self::dispose_into(&mut slot, &mut report);
        Ok(report)
    }

    /// Dispose and erase every subsystem, last registered first
    ///
    /// Subsystems that were never initialized are dropped without a
    /// `dispose` call. Errors recovered by earlier failed initializations
    /// come first in the report. Never fails; see [`DisposeReport`].
    pub fn dispose_all(&mut self) -> DisposeReport {
        let mut report = DisposeReport {
            disposed: Vec::new(),
            recovered: std::mem::take(&mut self.pending),
        };

        while let Some(handle) = self.order.pop() {
            if let Some(mut slot) = self.slots.remove(&handle) {
                Self::dispose_into(&mut slot, &mut report);
            }
        }

        assert!(
            self.slots.is_empty() && self.order.is_empty(),
            "registry not empty after dispose_all"
        );
        report
    }

    fn dispose_into(slot: &mut Slot, report: &mut DisposeReport) {
        if slot.state != SubsystemState::Initialized {
            return;
        }
        report.disposed.push(slot.subsystem.name());
        if let Err(err) = Self::dispose_slot(slot) {
            report.recovered.push(err);
        }
    }

    /// Call `dispose` on an initialized slot and reset it to `Registered`
    ///
    /// Errors are logged here; callers decide whether to record them.
    fn dispose_slot(slot: &mut Slot) -> Result<()> {
        let name = slot.subsystem.name();
        slot.state = SubsystemState::Registered;

        match slot.subsystem.dispose() {
            Ok(()) => {
                crate::runtime_debug!("galaxy3d::Registry", "Disposed '{}'", name);
                Ok(())
            }
            Err(err) => {
                let err = match err {
                    Error::DisposeFailed { .. } => err,
                    other => Error::DisposeFailed {
                        subsystem: name,
                        reason: other.to_string(),
                    },
                };
                Err(crate::runtime_err!("galaxy3d::Registry", err))
            }
        }
    }
}

impl Drop for SubsystemRegistry {
    fn drop(&mut self) {
        if self.slots.values().any(|slot| slot.state == SubsystemState::Initialized) {
            crate::runtime_warn!("galaxy3d::Registry",
                "Registry dropped with initialized subsystems, disposing them");
            self.dispose_all();
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
