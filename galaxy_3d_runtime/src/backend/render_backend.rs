/// RenderBackend trait - the only rendering surface subsystems see

use std::cell::RefCell;
use std::rc::Rc;
use slotmap::new_key_type;

use crate::error::Result;

new_key_type! {
    /// Opaque handle to a backend buffer
    pub struct BufferHandle;
}

/// Backend counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendStats {
    /// Buffers currently alive
    pub live_buffers: usize,
    /// Draw calls since startup
    pub draw_calls: u64,
    /// Vertices submitted since startup
    pub vertices: u64,
}

/// Rendering backend as seen by subsystems
///
/// Every resource call fails with `BackendError` while the backend is not
/// started, and with `InvalidResource` for a stale handle.
pub trait RenderBackend {
    /// Bring the backend up
    fn startup(&mut self) -> Result<()>;

    /// Tear the backend down
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if buffers are still alive; the backend is
    /// shut down anyway and the buffers are released.
    fn shutdown(&mut self) -> Result<()>;

    fn is_ready(&self) -> bool;

    /// Create a buffer initialized with `data`
    fn create_buffer(&mut self, label: &str, data: &[u8]) -> Result<BufferHandle>;

    /// Destroy a buffer
    fn destroy_buffer(&mut self, handle: BufferHandle) -> Result<()>;

    /// Whether `handle` refers to a live buffer
    fn is_valid(&self, handle: BufferHandle) -> bool;

    /// Draw `vertex_count` vertices of `handle` as a line list
    fn draw_lines(&mut self, handle: BufferHandle, vertex_count: u32) -> Result<()>;

    fn stats(&self) -> BackendStats;
}

/// Backend shared between the renderer subsystem and its dependents
pub type SharedBackend = Rc<RefCell<dyn RenderBackend>>;

/// Wrap a backend for sharing
pub fn shared_backend<B: RenderBackend + 'static>(backend: B) -> SharedBackend {
    Rc::new(RefCell::new(backend))
}
