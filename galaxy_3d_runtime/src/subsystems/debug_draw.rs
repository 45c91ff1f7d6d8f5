/// Debug draw subsystem.
///
/// Collects colored line segments during the frame and submits them to the
/// render backend on FrameRender. The buffer of the last submitted frame is
/// kept alive until the next submission (the GPU may still read it), and is
/// released in dispose. That is why DebugDraw must be registered after the
/// RendererSubsystem that owns the backend.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::backend::{BufferHandle, SharedBackend};
use crate::error::{Error, Result};
use crate::event::{FrameEvent, FrameEventBus, Subscription};
use crate::subsystem::{Subsystem, SubsystemHandle};

const SOURCE: &str = "galaxy3d::DebugDraw";
const BUFFER_LABEL: &str = "debug_draw_lines";

/// One line-list vertex as uploaded to the backend
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Per-frame state shared with the FrameRender listener
#[derive(Default)]
struct Batch {
    vertices: RefCell<Vec<LineVertex>>,
    retained: Cell<Option<BufferHandle>>,
    frames_submitted: Cell<u64>,
}

pub struct DebugDraw {
    backend: SharedBackend,
    batch: Rc<Batch>,
    subscription: Option<Subscription>,
}

impl DebugDraw {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            batch: Rc::new(Batch::default()),
            subscription: None,
        }
    }

    /// Queue a segment for the current frame
    pub fn line(&self, from: Vec3, to: Vec3, color: Vec4) {
        let color = color.to_array();
        let mut vertices = self.batch.vertices.borrow_mut();
        vertices.push(LineVertex { position: from.to_array(), color });
        vertices.push(LineVertex { position: to.to_array(), color });
    }

    /// Queue the three axes of a transform origin (X red, Y green, Z blue)
    pub fn axes(&self, origin: Vec3, length: f32) {
        self.line(origin, origin + Vec3::X * length, Vec4::new(1.0, 0.0, 0.0, 1.0));
        self.line(origin, origin + Vec3::Y * length, Vec4::new(0.0, 1.0, 0.0, 1.0));
        self.line(origin, origin + Vec3::Z * length, Vec4::new(0.0, 0.0, 1.0, 1.0));
    }

    /// Segments queued for the current frame
    pub fn pending_lines(&self) -> usize {
        self.batch.vertices.borrow().len() / 2
    }

    /// Frames for which a batch was submitted
    pub fn frames_submitted(&self) -> u64 {
        self.batch.frames_submitted.get()
    }

    /// Buffer of the last submitted batch, if still alive
    pub fn retained_buffer(&self) -> Option<BufferHandle> {
        self.batch.retained.get()
    }

    fn submit(backend: &SharedBackend, batch: &Batch) {
        let vertices = std::mem::take(&mut *batch.vertices.borrow_mut());
        let mut backend = backend.borrow_mut();

        if let Some(previous) = batch.retained.take() {
            if let Err(err) = backend.destroy_buffer(previous) {
                crate::runtime_warn!(SOURCE, "Could not release previous batch: {}", err);
            }
        }
        if vertices.is_empty() {
            return;
        }
        let Some(count) = vertex_count(vertices.len()) else {
            crate::runtime_warn!(SOURCE,
                "Dropped {} line(s): vertex count exceeds u32", vertices.len() / 2);
            return;
        };

        let handle = match backend.create_buffer(BUFFER_LABEL, bytemuck::cast_slice(&vertices)) {
            Ok(handle) => handle,
            Err(err) => {
                crate::runtime_warn!(SOURCE, "Dropped {} line(s): {}", vertices.len() / 2, err);
                return;
            }
        };
        batch.retained.set(Some(handle));

        match backend.draw_lines(handle, count) {
            Ok(()) => batch.frames_submitted.set(batch.frames_submitted.get() + 1),
            Err(err) => crate::runtime_warn!(SOURCE, "Draw failed: {}", err),
        }
    }
}

/// Vertex count as the backend takes it, `None` past `u32::MAX`
fn vertex_count(len: usize) -> Option<u32> {
    u32::try_from(len).ok()
}

impl Subsystem for DebugDraw {
    fn initialize(&mut self, bus: &FrameEventBus) -> Result<()> {
        if !self.backend.borrow().is_ready() {
            return Err(Error::InitializationFailed {
                subsystem: "DebugDraw",
                reason: "render backend not started (register RendererSubsystem first)".to_string(),
            });
        }

        let backend = self.backend.clone();
        let batch = self.batch.clone();
        self.subscription = Some(bus.subscribe(
            FrameEvent::FrameRender,
            SubsystemHandle::of::<Self>(),
            move |_| Self::submit(&backend, &batch),
        ));
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        self.subscription = None;
        self.batch.vertices.borrow_mut().clear();

        if let Some(handle) = self.batch.retained.take() {
            self.backend.borrow_mut().destroy_buffer(handle)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "debug_draw_tests.rs"]
mod tests;
