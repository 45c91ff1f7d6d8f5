/// Subsystem trait and type handle.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::event::FrameEventBus;

/// Downcasting support for subsystems
///
/// Implemented for every `'static` type; subsystems never implement it by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// An independently lifecycled engine facility
///
/// The registry calls `initialize` once, in registration order, and
/// `dispose` once, in reverse registration order. A subsystem that
/// subscribes to frame events in `initialize` must release those
/// subscriptions in `dispose`; keeping the `Subscription` guards as fields
/// and dropping them there is the usual way.
///
/// # Example
///
/// ```
/// use galaxy_3d_runtime::galaxy3d::Result;
/// use galaxy_3d_runtime::galaxy3d::event::{FrameEvent, FrameEventBus, Subscription};
/// use galaxy_3d_runtime::galaxy3d::subsystem::{Subsystem, SubsystemHandle};
///
/// #[derive(Default)]
/// struct FpsCounter {
///     subscription: Option<Subscription>,
/// }
///
/// impl Subsystem for FpsCounter {
///     fn initialize(&mut self, bus: &FrameEventBus) -> Result<()> {
///         self.subscription = Some(bus.subscribe(
///             FrameEvent::FrameEnd,
///             SubsystemHandle::of::<Self>(),
///             |tick| println!("{:.1} fps", 1.0 / tick.delta_seconds),
///         ));
///         Ok(())
///     }
///
///     fn dispose(&mut self) -> Result<()> {
///         self.subscription = None;
///         Ok(())
///     }
/// }
/// ```
pub trait Subsystem: AsAny {
    /// Human-readable name, used in logs and reports
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Acquire resources and attach frame listeners
    ///
    /// An error aborts the aggregate initialization of the registry.
    fn initialize(&mut self, bus: &FrameEventBus) -> Result<()>;

    /// Release resources and detach every frame listener
    ///
    /// Best effort: an error is logged and reported, and teardown continues
    /// with the next subsystem.
    fn dispose(&mut self) -> Result<()>;
}

/// Lifecycle state of one registered subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsystemState {
    /// Stored, `initialize` not called (or unwound after a failed batch)
    Registered,
    /// `initialize` succeeded, `dispose` still owed
    Initialized,
}

/// Opaque identity of a subsystem type
///
/// Used as the registry key and as listener owner identity on the event bus.
/// Two handles are equal when they name the same type.
#[derive(Clone, Copy)]
pub struct SubsystemHandle {
    type_id: TypeId,
    name: &'static str,
}

impl SubsystemHandle {
    /// Handle of type `T`
    pub fn of<T: Any>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
        }
    }

    /// Short type name (module path stripped)
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl PartialEq for SubsystemHandle {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for SubsystemHandle {}

impl Hash for SubsystemHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for SubsystemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubsystemHandle({})", self.name)
    }
}

impl fmt::Display for SubsystemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// `a::b::Camera<c::D>` -> `Camera<c::D>`
fn short_type_name(full: &'static str) -> &'static str {
    let path = match full.find('<') {
        Some(generic_start) => &full[..generic_start],
        None => full,
    };
    match path.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
