/// GlGraphicsContext - GraphicsContext implementation over glow

use std::num::NonZeroU32;
use glow::HasContext;
use galaxy_2d_offscreen::galaxy2d::{Error, Result};
use galaxy_2d_offscreen::galaxy2d::context::{
    GraphicsContext, ContextVersion, TextureId, FramebufferId, FramebufferTarget,
    FramebufferStatus, TextureWrap, TextureFilter, ClearMask, Rect2D,
};
use galaxy_2d_offscreen::engine_trace;

const LOG_SOURCE: &str = "galaxy2d::gl";

/// OpenGL graphics context
///
/// Owns the `glow::Context`. The GL context must be current on the calling
/// thread for every method.
///
/// # Example
///
/// ```no_run
/// use std::rc::Rc;
/// use galaxy_2d_offscreen::galaxy2d::context::GraphicsContext;
/// use galaxy_2d_offscreen::galaxy2d::offscreen::OffscreenManager;
/// use galaxy_2d_offscreen_renderer_gl::GlGraphicsContext;
///
/// # fn run(gl: glow::Context) -> galaxy_2d_offscreen::galaxy2d::Result<()> {
/// let context: Rc<dyn GraphicsContext> = Rc::new(GlGraphicsContext::new(gl));
/// let mut manager = OffscreenManager::new(context);
/// let mask = manager.acquire(512, 512)?;
/// manager.begin_draw(mask)?;
/// manager.end_draw(mask)?;
/// manager.release(mask);
/// # Ok(())
/// # }
/// ```
pub struct GlGraphicsContext {
    gl: glow::Context,
    version: ContextVersion,
}

impl GlGraphicsContext {
    /// Wrap a glow context
    pub fn new(gl: glow::Context) -> Self {
        let version = {
            let v = gl.version();
            ContextVersion::new(v.major, v.minor, v.is_embedded)
        };
        engine_trace!(LOG_SOURCE, "Wrapping {} context", version);
        Self { gl, version }
    }

    /// Underlying glow context
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}

// ===== HANDLE CONVERSION =====

fn native_texture(texture: TextureId) -> Option<glow::NativeTexture> {
    NonZeroU32::new(texture.0).map(glow::NativeTexture)
}

fn native_framebuffer(framebuffer: FramebufferId) -> Option<glow::NativeFramebuffer> {
    NonZeroU32::new(framebuffer.0).map(glow::NativeFramebuffer)
}

/// GL object creation failure
///
/// Not logged here: the caller reports it with the surface size attached.
pub(crate) fn backend_error(call: &str, message: String) -> Error {
    Error::BackendError(format!("{} failed: {}", call, message))
}

/// Pixel extent as GLsizei, saturating at `i32::MAX`
pub(crate) fn gl_size(size: u32) -> i32 {
    i32::try_from(size).unwrap_or(i32::MAX)
}

// ===== ENUM CONVERSION =====

pub(crate) fn gl_framebuffer_target(target: FramebufferTarget) -> u32 {
    match target {
        FramebufferTarget::Framebuffer => glow::FRAMEBUFFER,
        FramebufferTarget::Read => glow::READ_FRAMEBUFFER,
        FramebufferTarget::Draw => glow::DRAW_FRAMEBUFFER,
    }
}

pub(crate) fn gl_framebuffer_status(status: u32) -> FramebufferStatus {
    match status {
        glow::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
        glow::FRAMEBUFFER_UNDEFINED => FramebufferStatus::Undefined,
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => FramebufferStatus::IncompleteMissingAttachment,
        // GLES 2.0 only, absent from the desktop headers
        0x8CD9 => FramebufferStatus::IncompleteDimensions,
        glow::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
        other => FramebufferStatus::Unknown(other),
    }
}

pub(crate) fn gl_texture_wrap(wrap: TextureWrap) -> i32 {
    (match wrap {
        TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE,
        TextureWrap::Repeat => glow::REPEAT,
        TextureWrap::MirroredRepeat => glow::MIRRORED_REPEAT,
    }) as i32
}

pub(crate) fn gl_filter(filter: TextureFilter) -> u32 {
    match filter {
        TextureFilter::Nearest => glow::NEAREST,
        TextureFilter::Linear => glow::LINEAR,
    }
}

pub(crate) fn gl_clear_mask(mask: ClearMask) -> u32 {
    let mut bits = 0;
    if mask.contains(ClearMask::COLOR) {
        bits |= glow::COLOR_BUFFER_BIT;
    }
    if mask.contains(ClearMask::DEPTH) {
        bits |= glow::DEPTH_BUFFER_BIT;
    }
    if mask.contains(ClearMask::STENCIL) {
        bits |= glow::STENCIL_BUFFER_BIT;
    }
    bits
}

// ===== GRAPHICS CONTEXT =====

impl GraphicsContext for GlGraphicsContext {
    fn version(&self) -> ContextVersion {
        self.version
    }

    fn create_texture(&self) -> Result<TextureId> {
        // SAFETY: the GL context is current on this thread.
        let texture = unsafe { self.gl.create_texture() }.map_err(|e| {
            backend_error("glGenTextures", e)
        })?;
        Ok(TextureId(texture.0.get()))
    }

    fn delete_texture(&self, texture: TextureId) {
        if let Some(texture) = native_texture(texture) {
            unsafe { self.gl.delete_texture(texture) };
        }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) };
    }

    fn bind_texture_2d(&self, texture: Option<TextureId>) {
        let texture = texture.and_then(native_texture);
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, texture) };
    }

    fn tex_image_2d_rgba(&self, width: u32, height: u32) {
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                gl_size(width),
                gl_size(height),
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(None),
            );
        }
    }

    fn set_texture_wrap(&self, wrap: TextureWrap) {
        let wrap = gl_texture_wrap(wrap);
        unsafe {
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap);
        }
    }

    fn set_texture_filter(&self, filter: TextureFilter) {
        let filter = gl_filter(filter) as i32;
        unsafe {
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter);
        }
    }

    fn create_framebuffer(&self) -> Result<FramebufferId> {
        let framebuffer = unsafe { self.gl.create_framebuffer() }.map_err(|e| {
            backend_error("glGenFramebuffers", e)
        })?;
        Ok(FramebufferId(framebuffer.0.get()))
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        if let Some(framebuffer) = native_framebuffer(framebuffer) {
            unsafe { self.gl.delete_framebuffer(framebuffer) };
        }
    }

    fn bind_framebuffer(&self, target: FramebufferTarget, framebuffer: FramebufferId) {
        engine_trace!(LOG_SOURCE, "bind {:?} -> {}", target, framebuffer.0);
        unsafe {
            self.gl.bind_framebuffer(gl_framebuffer_target(target), native_framebuffer(framebuffer));
        }
    }

    fn attach_color_texture(&self, texture: Option<TextureId>) {
        unsafe {
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                texture.and_then(native_texture),
                0,
            );
        }
    }

    fn check_framebuffer_status(&self) -> FramebufferStatus {
        let status = unsafe { self.gl.check_framebuffer_status(glow::FRAMEBUFFER) };
        gl_framebuffer_status(status)
    }

    fn current_framebuffer(&self) -> FramebufferId {
        let binding = unsafe { self.gl.get_parameter_i32(glow::FRAMEBUFFER_BINDING) };
        FramebufferId(binding.max(0) as u32)
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { self.gl.clear_color(r, g, b, a) };
    }

    fn clear(&self, mask: ClearMask) {
        unsafe { self.gl.clear(gl_clear_mask(mask)) };
    }

    fn blit_framebuffer(&self, src: Rect2D, dst: Rect2D, mask: ClearMask, filter: TextureFilter) {
        engine_trace!(LOG_SOURCE, "blit {:?} -> {:?}", src, dst);
        unsafe {
            self.gl.blit_framebuffer(
                src.x, src.y, src.x1(), src.y1(),
                dst.x, dst.y, dst.x1(), dst.y1(),
                gl_clear_mask(mask),
                gl_filter(filter),
            );
        }
    }
}

#[cfg(test)]
#[path = "gl_context_tests.rs"]
mod tests;
