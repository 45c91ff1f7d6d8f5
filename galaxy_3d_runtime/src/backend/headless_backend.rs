/// Headless render backend
///
/// Keeps buffers in memory and counts draws. Used for tools, servers and
/// tests that run the frame loop without a GPU.

use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::runtime_bail;
use super::render_backend::{BackendStats, BufferHandle, RenderBackend};

struct HeadlessBuffer {
    label: String,
    data: Vec<u8>,
}

/// In-memory RenderBackend
#[derive(Default)]
pub struct HeadlessBackend {
    buffers: SlotMap<BufferHandle, HeadlessBuffer>,
    ready: bool,
    draw_calls: u64,
    vertices: u64,
}

impl HeadlessBackend {
    /// Create a backend (not started)
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents of a live buffer
    pub fn buffer_data(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(handle).map(|buffer| buffer.data.as_slice())
    }

    /// Label of a live buffer
    pub fn buffer_label(&self, handle: BufferHandle) -> Option<&str> {
        self.buffers.get(handle).map(|buffer| buffer.label.as_str())
    }

    fn ensure_ready(&self, operation: &str) -> Result<()> {
        if !self.ready {
            runtime_bail!("galaxy3d::HeadlessBackend",
                Error::BackendError(format!("{}: backend not started", operation)));
        }
        Ok(())
    }
}

impl RenderBackend for HeadlessBackend {
    fn startup(&mut self) -> Result<()> {
        if self.ready {
            runtime_bail!("galaxy3d::HeadlessBackend",
                Error::BackendError("backend already started".to_string()));
        }
        self.ready = true;
        self.draw_calls = 0;
        self.vertices = 0;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.ready = false;
        let leaked = self.buffers.len();
        self.buffers.clear();
        if leaked > 0 {
            runtime_bail!("galaxy3d::HeadlessBackend",
                Error::BackendError(format!("{} buffer(s) still alive at shutdown", leaked)));
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn create_buffer(&mut self, label: &str, data: &[u8]) -> Result<BufferHandle> {
        self.ensure_ready("create_buffer")?;
        if data.is_empty() {
            runtime_bail!("galaxy3d::HeadlessBackend",
                Error::InvalidResource(format!("buffer '{}' has no data", label)));
        }
        Ok(self.buffers.insert(HeadlessBuffer {
            label: label.to_string(),
            data: data.to_vec(),
        }))
    }

    fn destroy_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        self.ensure_ready("destroy_buffer")?;
        if self.buffers.remove(handle).is_none() {
            runtime_bail!("galaxy3d::HeadlessBackend",
                Error::InvalidResource(format!("destroy_buffer: stale handle {:?}", handle)));
        }
        Ok(())
    }

    fn is_valid(&self, handle: BufferHandle) -> bool {
        self.ready && self.buffers.contains_key(handle)
    }

    fn draw_lines(&mut self, handle: BufferHandle, vertex_count: u32) -> Result<()> {
        self.ensure_ready("draw_lines")?;
        if !self.buffers.contains_key(handle) {
            runtime_bail!("galaxy3d::HeadlessBackend",
                Error::InvalidResource(format!("draw_lines: stale handle {:?}", handle)));
        }
        if vertex_count % 2 != 0 {
            runtime_bail!("galaxy3d::HeadlessBackend",
                Error::InvalidResource(format!("draw_lines: odd vertex count {}", vertex_count)));
        }
        self.draw_calls += 1;
        self.vertices += u64::from(vertex_count);
        Ok(())
    }

    fn stats(&self) -> BackendStats {
        BackendStats {
            live_buffers: self.buffers.len(),
            draw_calls: self.draw_calls,
            vertices: self.vertices,
        }
    }
}

#[cfg(test)]
#[path = "headless_backend_tests.rs"]
mod tests;
