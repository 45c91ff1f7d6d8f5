/// Camera update subsystem.
///
/// Integrates a velocity into the camera position on every FrameBegin and
/// keeps the view matrix in sync.

use std::cell::RefCell;
use std::rc::Rc;
use glam::{Mat4, Vec3};

use crate::error::Result;
use crate::event::{FrameEvent, FrameEventBus, FrameTick, Subscription};
use crate::subsystem::{Subsystem, SubsystemHandle};

/// Camera pose and motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// World units per second, applied to both position and target
    pub velocity: Vec3,
    /// Right-handed look-at matrix for `position`/`target`/`up`
    pub view: Mat4,
}

impl CameraState {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        let up = Vec3::Y;
        Self {
            position,
            target,
            up,
            velocity: Vec3::ZERO,
            view: Mat4::look_at_rh(position, target, up),
        }
    }

    fn advance(&mut self, tick: &FrameTick) {
        let step = self.velocity * tick.delta_seconds;
        self.position += step;
        self.target += step;
        self.view = Mat4::look_at_rh(self.position, self.target, self.up);
    }
}

pub struct CameraController {
    state: Rc<RefCell<CameraState>>,
    subscription: Option<Subscription>,
}

impl CameraController {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            state: Rc::new(RefCell::new(CameraState::new(position, target))),
            subscription: None,
        }
    }

    /// Snapshot of the current camera state
    pub fn state(&self) -> CameraState {
        *self.state.borrow()
    }

    pub fn set_velocity(&self, velocity: Vec3) {
        self.state.borrow_mut().velocity = velocity;
    }

    /// Move the camera immediately (outside of the frame update)
    pub fn look_at(&self, position: Vec3, target: Vec3) {
        let mut state = self.state.borrow_mut();
        state.position = position;
        state.target = target;
        state.view = Mat4::look_at_rh(position, target, state.up);
    }
}

impl Subsystem for CameraController {
    fn initialize(&mut self, bus: &FrameEventBus) -> Result<()> {
        let state = self.state.clone();
        self.subscription = Some(bus.subscribe(
            FrameEvent::FrameBegin,
            SubsystemHandle::of::<Self>(),
            move |tick| state.borrow_mut().advance(tick),
        ));
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        self.subscription = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "camera_controller_tests.rs"]
mod tests;
