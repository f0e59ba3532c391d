//! Offscreen render target module
//!
//! Offscreen surfaces are intermediate drawing destinations used by the
//! clipping-mask and part-compositing passes. The `RenderTarget` trait
//! carries the chain bookkeeping, `OffscreenSurface` the GPU resources and
//! `OffscreenManager` pools them.

mod render_target;
mod offscreen_surface;
mod offscreen_manager;

pub use render_target::{RenderTarget, SurfaceKey};
pub use offscreen_surface::OffscreenSurface;
pub use offscreen_manager::{OffscreenManager, OffscreenManagerConfig};
