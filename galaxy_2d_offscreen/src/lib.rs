/*!
# Galaxy 2D Offscreen

Offscreen render targets for the Galaxy 2D character renderer.

Clipping masks and part compositing are drawn into intermediate color buffers
before they reach the screen. This crate owns those buffers: it creates and
validates the texture/framebuffer pairs, binds them with save/restore
semantics so that offscreen passes can nest, blits between them, and pools
them across frames.

## Architecture

- **GraphicsContext**: Capability trait over the GPU context (GL-style bound state)
- **RenderTarget**: Chain bookkeeping trait (offscreen index, previous and parent links)
- **OffscreenSurface**: GPU-backed render target (one color texture + one framebuffer)
- **OffscreenManager**: Pool handing out `SurfaceKey` handles, reusing surfaces by size

Backend implementations (OpenGL via glow, ...) provide concrete
`GraphicsContext` types.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_context;
pub mod offscreen;
mod utils;

// Main galaxy2d namespace module
pub mod galaxy2d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Graphics context capability
    pub mod context {
        pub use crate::graphics_context::*;
    }

    // Offscreen sub-module
    pub mod offscreen {
        pub use crate::offscreen::*;
    }
}
