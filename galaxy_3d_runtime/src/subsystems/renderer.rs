/// Renderer subsystem.
///
/// Owns the lifetime of the render backend: starts it on initialize and
/// shuts it down on dispose. Subsystems that draw (DebugDraw, ...) share the
/// same backend and must be registered after this one so they are torn
/// down first.

use crate::backend::SharedBackend;
use crate::error::Result;
use crate::event::FrameEventBus;
use crate::subsystem::Subsystem;

pub struct RendererSubsystem {
    backend: SharedBackend,
}

impl RendererSubsystem {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Shared handle to the backend
    pub fn backend(&self) -> SharedBackend {
        self.backend.clone()
    }
}

impl Subsystem for RendererSubsystem {
    fn initialize(&mut self, _bus: &FrameEventBus) -> Result<()> {
        self.backend.borrow_mut().startup()?;
        crate::runtime_info!("galaxy3d::Renderer", "Render backend started");
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        self.backend.borrow_mut().shutdown()?;
        crate::runtime_info!("galaxy3d::Renderer", "Render backend shut down");
        Ok(())
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
