//! Built-in engine subsystems
//!
//! Concrete facilities registered into a Runtime. Each one attaches its
//! frame listeners in `initialize` and releases them in `dispose`.

mod renderer;
mod camera_controller;
mod debug_draw;
mod picking;

pub use renderer::RendererSubsystem;
pub use camera_controller::{CameraController, CameraState};
pub use debug_draw::{DebugDraw, LineVertex};
pub use picking::{nearest_hit, Pickable, PickHit, Picking, Ray};
