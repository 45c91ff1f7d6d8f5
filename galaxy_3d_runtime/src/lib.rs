/*!
# Galaxy 3D Runtime

Subsystem lifecycle and frame event dispatch for the Galaxy 3D engine.

A `Runtime` owns a registry of subsystems (renderer, camera update, debug
draw, picking...), initializes them in registration order, broadcasts the
per-frame events they listen to, and tears them down in reverse order.

## Architecture

- **Runtime**: Lifecycle driver (`Idle -> Running -> Disposed`) and frame loop
- **Subsystem**: Trait every engine facility implements
- **SubsystemRegistry**: One instance per type, disposed last-in first-out
- **FrameEventBus**: Broadcast of FrameBegin / FrameRender / FrameEnd
- **RenderBackend**: Opaque resource contract the drawing subsystems go through

Failures during teardown never abort it: they are logged and collected in a
`DisposeReport`.
*/

// Internal modules
mod error;
mod status;
mod config;
mod runtime;
pub mod log;
pub mod event;
pub mod subsystem;
pub mod backend;
pub mod subsystems;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, ErrorKind, Result};

    // Lifecycle driver
    pub use crate::runtime::Runtime;
    pub use crate::config::RuntimeConfig;
    pub use crate::status::{Status, StatusCell};

    // Logging sub-module (types and logger slot, NOT macros)
    pub mod log {
        pub use crate::log::{
            Logger, LogEntry, LogSeverity, DefaultLogger,
            set_logger, reset_logger, log, log_detailed,
        };
    }

    // Frame event sub-module
    pub mod event {
        pub use crate::event::*;
    }

    // Subsystem contract sub-module
    pub mod subsystem {
        pub use crate::subsystem::*;
    }

    // Render backend sub-module
    pub mod backend {
        pub use crate::backend::*;
    }

    // Built-in subsystems
    pub mod subsystems {
        pub use crate::subsystems::*;
    }
}

// Re-export math library at crate root
pub use glam;
