//! Error types for the Galaxy2D offscreen subsystem
//!
//! This module defines the errors reported while creating offscreen
//! surfaces, blitting between them and managing the surface pool.

use std::fmt;
use crate::graphics_context::FramebufferStatus;

/// Result type for Galaxy2D offscreen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy2D offscreen errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (OpenGL, GLES, etc.)
    BackendError(String),

    /// The context lacks a capability required by the call (e.g. framebuffer blit)
    UnsupportedCapability(String),

    /// Texture or framebuffer creation failed
    AllocationFailed(String),

    /// Framebuffer completeness check failed after attaching the color buffer
    IncompleteFramebuffer(FramebufferStatus),

    /// Invalid resource (unknown surface key, released surface, etc.)
    InvalidResource(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::UnsupportedCapability(msg) => write!(f, "Unsupported capability: {}", msg),
            Error::AllocationFailed(msg) => write!(f, "Allocation failed: {}", msg),
            Error::IncompleteFramebuffer(status) => write!(f, "Incomplete framebuffer: {}", status),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
