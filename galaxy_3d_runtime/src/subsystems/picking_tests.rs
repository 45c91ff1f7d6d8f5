/// Tests for Picking
///
/// These tests validate ray construction, sphere intersection and the
/// FrameEnd resolution of queued pick requests.

use super::*;
use crate::event::FrameTick;

fn end_frame(bus: &FrameEventBus) {
    bus.publish(FrameEvent::FrameEnd, &FrameTick::new(0, 0.016));
}

#[test]
fn test_ray_direction_is_normalized() {
    let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0));
    assert_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0));
}

#[test]
fn test_intersect_sphere_hit_and_miss() {
    let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
    assert_eq!(ray.intersect_sphere(Vec3::new(0.0, 0.0, -5.0), 1.0), Some(4.0));
    assert_eq!(ray.intersect_sphere(Vec3::new(3.0, 0.0, -5.0), 1.0), None);
    // Sphere behind the origin
    assert_eq!(ray.intersect_sphere(Vec3::new(0.0, 0.0, 5.0), 1.0), None);
}

#[test]
fn test_intersect_sphere_from_inside() {
    let ray = Ray::new(Vec3::ZERO, Vec3::X);
    assert_eq!(ray.intersect_sphere(Vec3::ZERO, 2.0), Some(2.0));
}

#[test]
fn test_nearest_hit_picks_closest() {
    let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
    let pickables = [
        Pickable { id: 1, center: Vec3::new(0.0, 0.0, -10.0), radius: 1.0 },
        Pickable { id: 2, center: Vec3::new(0.0, 0.0, -4.0), radius: 1.0 },
        Pickable { id: 3, center: Vec3::new(5.0, 0.0, -4.0), radius: 1.0 },
    ];

    let hit = nearest_hit(&ray, &pickables).unwrap();
    assert_eq!(hit.id, 2);
    assert_eq!(hit.distance, 3.0);
    assert_eq!(hit.point, Vec3::new(0.0, 0.0, -3.0));
}

#[test]
fn test_ray_from_ndc_center() {
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    let ray = Ray::from_ndc((projection * view).inverse(), Vec2::ZERO);

    assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    assert!((ray.origin - Vec3::new(0.0, 0.0, 4.9)).length() < 1e-3);
}

#[test]
fn test_pickable_management() {
    let picking = Picking::new();
    picking.set_pickable(1, Vec3::ZERO, 1.0);
    picking.set_pickable(2, Vec3::X, 1.0);
    picking.set_pickable(1, Vec3::Y, 2.0);

    assert_eq!(picking.pickable_count(), 2);
    assert!(picking.remove_pickable(2));
    assert!(!picking.remove_pickable(2));
    assert_eq!(picking.pickable_count(), 1);
}

#[test]
fn test_pick_resolved_on_frame_end() {
    let bus = FrameEventBus::new();
    let mut picking = Picking::new();
    picking.initialize(&bus).unwrap();
    picking.set_pickable(7, Vec3::new(0.0, 0.0, -5.0), 1.0);

    picking.request_pick(Ray::new(Vec3::ZERO, Vec3::NEG_Z));
    assert!(picking.has_pending_pick());
    assert!(picking.last_pick().is_none());

    bus.publish(FrameEvent::FrameBegin, &FrameTick::new(0, 0.016));
    assert!(picking.has_pending_pick());

    end_frame(&bus);
    assert!(!picking.has_pending_pick());
    assert_eq!(picking.last_pick().map(|hit| hit.id), Some(7));
    assert_eq!(picking.resolved_count(), 1);

    // A miss clears the previous result
    picking.request_pick(Ray::new(Vec3::ZERO, Vec3::Z));
    end_frame(&bus);
    assert!(picking.last_pick().is_none());
    assert_eq!(picking.resolved_count(), 2);
}

#[test]
fn test_frame_end_without_request_keeps_result() {
    let bus = FrameEventBus::new();
    let mut picking = Picking::new();
    picking.initialize(&bus).unwrap();
    picking.set_pickable(1, Vec3::new(0.0, 0.0, -5.0), 1.0);
    picking.request_pick(Ray::new(Vec3::ZERO, Vec3::NEG_Z));
    end_frame(&bus);

    end_frame(&bus);
    assert_eq!(picking.last_pick().map(|hit| hit.id), Some(1));
    assert_eq!(picking.resolved_count(), 1);
}

#[test]
fn test_picking_dispose_unsubscribes() {
    let bus = FrameEventBus::new();
    let mut picking = Picking::new();
    picking.initialize(&bus).unwrap();
    picking.request_pick(Ray::new(Vec3::ZERO, Vec3::NEG_Z));

    picking.dispose().unwrap();
    assert!(bus.is_empty());
    assert!(!picking.has_pending_pick());
}
