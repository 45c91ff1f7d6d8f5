/// Picking subsystem.
///
/// The host queues a world-space ray (usually built from the cursor with
/// `Ray::from_ndc`); the nearest pickable sphere it hits is resolved on
/// FrameEnd, once the frame's transforms are final.
///
/// Resolution only happens when the runtime publishes FrameEnd: with
/// `RuntimeConfig::publish_frame_end` disabled a queued ray is never
/// resolved, and the runtime warns about it at initialization.

use std::cell::RefCell;
use std::rc::Rc;
use glam::{Mat4, Vec2, Vec3};

use crate::error::Result;
use crate::event::{FrameEvent, FrameEventBus, Subscription};
use crate::subsystem::{Subsystem, SubsystemHandle};

/// World-space ray with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray; `direction` is normalized (zero stays zero)
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction: direction.normalize_or_zero() }
    }

    /// Ray through a point in normalized device coordinates
    ///
    /// `inverse_view_projection` is the inverse of `projection * view` for a
    /// depth range of [0, 1] (glam's `perspective_rh`).
    pub fn from_ndc(inverse_view_projection: Mat4, ndc: Vec2) -> Self {
        let near = inverse_view_projection.project_point3(ndc.extend(0.0));
        let far = inverse_view_projection.project_point3(ndc.extend(1.0));
        Self::new(near, far - near)
    }

    /// Distance along the ray to the first intersection with a sphere
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let near = -b - root;
        if near >= 0.0 {
            return Some(near);
        }
        // Origin inside the sphere
        let far = -b + root;
        (far >= 0.0).then_some(far)
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Sphere that can be hit by a pick ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pickable {
    pub id: u32,
    pub center: Vec3,
    pub radius: f32,
}

/// Result of a resolved pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub id: u32,
    pub distance: f32,
    pub point: Vec3,
}

#[derive(Default)]
struct PickingState {
    pickables: Vec<Pickable>,
    pending: Option<Ray>,
    last_pick: Option<PickHit>,
    resolved: u64,
}

impl PickingState {
    fn resolve(&mut self) {
        let Some(ray) = self.pending.take() else {
            return;
        };
        self.last_pick = nearest_hit(&ray, &self.pickables);
        self.resolved += 1;
    }
}

/// Nearest pickable hit by `ray`
pub fn nearest_hit(ray: &Ray, pickables: &[Pickable]) -> Option<PickHit> {
    pickables
        .iter()
        .filter_map(|p| {
            ray.intersect_sphere(p.center, p.radius)
                .map(|distance| PickHit { id: p.id, distance, point: ray.at(distance) })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Ray picking against registered spheres
///
/// Requires `RuntimeConfig::publish_frame_end`; see the module docs.
#[derive(Default)]
pub struct Picking {
    state: Rc<RefCell<PickingState>>,
    subscription: Option<Subscription>,
}

impl Picking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the pickable with `id`
    pub fn set_pickable(&self, id: u32, center: Vec3, radius: f32) {
        let mut state = self.state.borrow_mut();
        let pickable = Pickable { id, center, radius: radius.abs() };
        match state.pickables.iter().position(|p| p.id == id) {
            Some(index) => state.pickables[index] = pickable,
            None => state.pickables.push(pickable),
        }
    }

    /// Remove the pickable with `id`; returns whether it existed
    pub fn remove_pickable(&self, id: u32) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.pickables.len();
        state.pickables.retain(|p| p.id != id);
        state.pickables.len() != before
    }

    pub fn pickable_count(&self) -> usize {
        self.state.borrow().pickables.len()
    }

    /// Queue a ray, resolved at the end of the current frame
    ///
    /// A later request in the same frame replaces the earlier one.
    pub fn request_pick(&self, ray: Ray) {
        self.state.borrow_mut().pending = Some(ray);
    }

    pub fn has_pending_pick(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// Result of the most recently resolved request (None if it hit nothing)
    pub fn last_pick(&self) -> Option<PickHit> {
        self.state.borrow().last_pick
    }

    /// Number of requests resolved so far
    pub fn resolved_count(&self) -> u64 {
        self.state.borrow().resolved
    }
}

impl Subsystem for Picking {
    fn initialize(&mut self, bus: &FrameEventBus) -> Result<()> {
        let state = self.state.clone();
        self.subscription = Some(bus.subscribe(
            FrameEvent::FrameEnd,
            SubsystemHandle::of::<Self>(),
            move |_| state.borrow_mut().resolve(),
        ));
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        self.subscription = None;
        self.state.borrow_mut().pending = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "picking_tests.rs"]
mod tests;
