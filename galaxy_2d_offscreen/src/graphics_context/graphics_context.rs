/// GraphicsContext trait - GL-style bound-state GPU context
///
/// Offscreen surfaces never talk to a graphics API directly. Everything they
/// need (texture and framebuffer objects, binding, completeness queries,
/// clear and blit) goes through this trait, implemented by backend crates.
///
/// The context is process-wide mutable state: the bound framebuffer may be
/// changed by any component between two calls, so callers query
/// `current_framebuffer()` at the point of need instead of caching it.

use std::fmt;
use bitflags::bitflags;
use crate::error::Result;

// ===== HANDLES =====

/// Texture object name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Framebuffer object name
///
/// `FramebufferId::DEFAULT` (0) is the window-system framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub u32);

impl FramebufferId {
    /// The default (window-system provided) framebuffer
    pub const DEFAULT: FramebufferId = FramebufferId(0);

    /// Whether this is the default framebuffer
    pub fn is_default(&self) -> bool {
        self.0 == 0
    }
}

impl Default for FramebufferId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ===== ENUMS =====

/// Framebuffer binding point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferTarget {
    /// Both read and draw binding points
    Framebuffer,
    /// Read binding point (blit source)
    Read,
    /// Draw binding point (blit destination)
    Draw,
}

/// Framebuffer completeness status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    Undefined,
    IncompleteAttachment,
    IncompleteMissingAttachment,
    IncompleteDimensions,
    Unsupported,
    /// Backend status code with no dedicated variant
    Unknown(u32),
}

impl FramebufferStatus {
    /// Whether the framebuffer can be rendered to
    pub fn is_complete(&self) -> bool {
        matches!(self, FramebufferStatus::Complete)
    }
}

impl fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramebufferStatus::Complete => write!(f, "complete"),
            FramebufferStatus::Undefined => write!(f, "undefined"),
            FramebufferStatus::IncompleteAttachment => write!(f, "incomplete attachment"),
            FramebufferStatus::IncompleteMissingAttachment => write!(f, "missing attachment"),
            FramebufferStatus::IncompleteDimensions => write!(f, "incomplete dimensions"),
            FramebufferStatus::Unsupported => write!(f, "unsupported"),
            FramebufferStatus::Unknown(code) => write!(f, "unknown status 0x{:04X}", code),
        }
    }
}

/// Texture coordinate wrap mode (applied to S and T)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

/// Sampling filter (texture min/mag filter, blit filter)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

bitflags! {
    /// Buffer selection for clear and blit
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Pixel rectangle (origin + extent)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    /// Rectangle anchored at the origin
    pub fn from_size(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    /// Exclusive right edge, saturating at `i32::MAX`
    pub fn x1(&self) -> i32 {
        self.x.saturating_add(i32::try_from(self.width).unwrap_or(i32::MAX))
    }

    /// Exclusive top edge, saturating at `i32::MAX`
    pub fn y1(&self) -> i32 {
        self.y.saturating_add(i32::try_from(self.height).unwrap_or(i32::MAX))
    }
}

/// Context API version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextVersion {
    pub major: u32,
    pub minor: u32,
    /// OpenGL ES (true) or desktop OpenGL (false)
    pub embedded: bool,
}

impl ContextVersion {
    pub fn new(major: u32, minor: u32, embedded: bool) -> Self {
        Self { major, minor, embedded }
    }

    /// Cross-framebuffer blit needs GL 3.0 or GLES 3.0
    pub fn supports_framebuffer_blit(&self) -> bool {
        self.major >= 3
    }
}

impl fmt::Display for ContextVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api = if self.embedded { "OpenGL ES" } else { "OpenGL" };
        write!(f, "{} {}.{}", api, self.major, self.minor)
    }
}

// ===== TRAIT =====

/// GPU context capability
///
/// All methods take `&self`: a GL context is a bag of global state and
/// backends keep whatever interior bookkeeping they need. Implementations
/// are used from the single thread that owns the context.
pub trait GraphicsContext {
    /// API version of the context
    fn version(&self) -> ContextVersion;

    // ----- Textures -----

    /// Create a texture object
    ///
    /// Failures are returned unlogged; `OffscreenSurface::create` reports them.
    fn create_texture(&self) -> Result<TextureId>;

    /// Delete a texture object
    fn delete_texture(&self, texture: TextureId);

    /// Select the active texture unit
    fn active_texture(&self, unit: u32);

    /// Bind a 2D texture to the active unit (`None` unbinds)
    fn bind_texture_2d(&self, texture: Option<TextureId>);

    /// Allocate RGBA8 storage for the bound 2D texture (no initial data)
    fn tex_image_2d_rgba(&self, width: u32, height: u32);

    /// Set S and T wrap of the bound 2D texture
    fn set_texture_wrap(&self, wrap: TextureWrap);

    /// Set min and mag filter of the bound 2D texture
    fn set_texture_filter(&self, filter: TextureFilter);

    // ----- Framebuffers -----

    /// Create a framebuffer object
    ///
    /// Failures are returned unlogged; `OffscreenSurface::create` reports them.
    fn create_framebuffer(&self) -> Result<FramebufferId>;

    /// Delete a framebuffer object
    fn delete_framebuffer(&self, framebuffer: FramebufferId);

    /// Bind a framebuffer to a binding point
    fn bind_framebuffer(&self, target: FramebufferTarget, framebuffer: FramebufferId);

    /// Attach a 2D texture as color attachment 0 of the bound framebuffer
    fn attach_color_texture(&self, texture: Option<TextureId>);

    /// Completeness of the bound framebuffer
    fn check_framebuffer_status(&self) -> FramebufferStatus;

    /// Currently bound (draw) framebuffer
    fn current_framebuffer(&self) -> FramebufferId;

    // ----- Drawing -----

    /// Set the clear color
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);

    /// Clear the selected buffers of the bound framebuffer
    fn clear(&self, mask: ClearMask);

    /// Copy a rectangle from the read framebuffer to the draw framebuffer
    ///
    /// Only called when `version().supports_framebuffer_blit()` holds.
    fn blit_framebuffer(&self, src: Rect2D, dst: Rect2D, mask: ClearMask, filter: TextureFilter);
}

#[cfg(test)]
#[path = "graphics_context_tests.rs"]
mod tests;
