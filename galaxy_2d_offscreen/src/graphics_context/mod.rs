/// Graphics context module - the GPU capability consumed by offscreen surfaces

pub mod graphics_context;

pub use graphics_context::*;

// Mock graphics context for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_context;
