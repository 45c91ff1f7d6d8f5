//! Render backend contract
//!
//! The runtime never talks to a graphics API. Subsystems that draw go
//! through `RenderBackend`, an opaque create/destroy/is_valid contract
//! implemented by the real renderer or by `HeadlessBackend`.

mod render_backend;
mod headless_backend;

pub use render_backend::{BackendStats, BufferHandle, RenderBackend, SharedBackend, shared_backend};
pub use headless_backend::HeadlessBackend;
