/// OffscreenSurface - GPU-backed render target
///
/// Owns exactly one RGBA color texture and one framebuffer object. Passes
/// bind it with `begin_draw`, draw, then `end_draw` to restore whatever was
/// bound before. Each surface remembers its own restore binding, so nested
/// passes (a mask pass inside a part pass inside the main pass) stack
/// without a shared binding stack.

use std::rc::Rc;
use crate::error::{Error, Result};
use crate::graphics_context::{
    GraphicsContext, TextureId, FramebufferId, FramebufferTarget, TextureWrap,
    TextureFilter, ClearMask, Rect2D,
};
use crate::offscreen::render_target::{RenderTarget, SurfaceKey};
use crate::{engine_debug, engine_err, engine_error, engine_warn};

const LOG_SOURCE: &str = "galaxy2d::OffscreenSurface";

/// Offscreen color buffer + framebuffer pair
///
/// A surface is either invalid (owns nothing) or valid (owns one texture and
/// one framebuffer of `buffer_width` x `buffer_height`). Resources are
/// released by `destroy`, by the next `create`, and on drop.
///
/// # Example
///
/// ```no_run
/// use std::rc::Rc;
/// use galaxy_2d_offscreen::galaxy2d::context::GraphicsContext;
/// use galaxy_2d_offscreen::galaxy2d::offscreen::OffscreenSurface;
///
/// fn draw_mask(context: &Rc<dyn GraphicsContext>) -> galaxy_2d_offscreen::galaxy2d::Result<()> {
///     let mut mask = OffscreenSurface::new();
///     mask.create(context, 256, 256, context.current_framebuffer())?;
///
///     mask.begin_draw(None);
///     mask.clear(1.0, 1.0, 1.0, 1.0);
///     // ... draw clipping geometry ...
///     mask.end_draw();
///     Ok(())
/// }
/// ```
pub struct OffscreenSurface {
    /// Context the resources were created against
    context: Option<Rc<dyn GraphicsContext>>,
    color_buffer: Option<TextureId>,
    framebuffer: Option<FramebufferId>,
    buffer_width: u32,
    buffer_height: u32,
    /// Binding to restore in `end_draw` (only set while drawing)
    saved_binding: Option<SavedBinding>,
    offscreen_index: Option<u32>,
    previous_surface: Option<SurfaceKey>,
    parent_surface: Option<SurfaceKey>,
}

/// Restore target captured by `begin_draw`
///
/// Holds its own context handle so `end_draw` still restores after the
/// surface was destroyed mid-pass.
struct SavedBinding {
    context: Rc<dyn GraphicsContext>,
    framebuffer: FramebufferId,
}

impl OffscreenSurface {
    /// Create an empty (invalid) surface
    pub fn new() -> Self {
        Self {
            context: None,
            color_buffer: None,
            framebuffer: None,
            buffer_width: 0,
            buffer_height: 0,
            saved_binding: None,
            offscreen_index: None,
            previous_surface: None,
            parent_surface: None,
        }
    }

    // ===== LIFECYCLE =====

    /// Allocate the color texture and framebuffer
    ///
    /// Any resources already owned are destroyed first. On success the
    /// surface is valid and `previous_binding` is bound again.
    ///
    /// # Errors
    ///
    /// - `AllocationFailed` if the texture or framebuffer cannot be created
    /// - `IncompleteFramebuffer` if the completeness check fails
    ///
    /// On error `previous_binding` is bound again, every partially created
    /// object is deleted and the surface stays invalid.
    pub fn create(
        &mut self,
        context: &Rc<dyn GraphicsContext>,
        width: u32,
        height: u32,
        previous_binding: FramebufferId,
    ) -> Result<()> {
        self.destroy();

        let mut color_buffer = None;
        let mut framebuffer = None;
        let result = Self::allocate(
            context.as_ref(),
            width,
            height,
            &mut color_buffer,
            &mut framebuffer,
        );

        // Leave the caller's binding in place whatever happened
        context.bind_framebuffer(FramebufferTarget::Framebuffer, previous_binding);

        if let Err(err) = result {
            engine_error!(LOG_SOURCE,
                "Failed to create {}x{} offscreen surface: {}", width, height, err);
            if let Some(texture) = color_buffer {
                Self::release_color_buffer(context.as_ref(), texture);
            }
            if let Some(fbo) = framebuffer {
                Self::release_framebuffer(context.as_ref(), fbo);
            }
            return Err(err);
        }

        self.color_buffer = color_buffer;
        self.framebuffer = framebuffer;
        self.buffer_width = width;
        self.buffer_height = height;
        self.context = Some(Rc::clone(context));

        engine_debug!(LOG_SOURCE,
            "Created {}x{} offscreen surface (framebuffer {:?}, color buffer {:?})",
            width, height, self.framebuffer, self.color_buffer);

        Ok(())
    }

    /// Create texture + framebuffer, reporting each object as soon as it exists
    fn allocate(
        context: &dyn GraphicsContext,
        width: u32,
        height: u32,
        color_buffer: &mut Option<TextureId>,
        framebuffer: &mut Option<FramebufferId>,
    ) -> Result<()> {
        let texture = context.create_texture()
            .map_err(|e| Error::AllocationFailed(format!("color buffer: {}", e)))?;
        *color_buffer = Some(texture);

        context.bind_texture_2d(Some(texture));
        context.tex_image_2d_rgba(width, height);
        context.set_texture_wrap(TextureWrap::ClampToEdge);
        context.set_texture_filter(TextureFilter::Linear);
        context.bind_texture_2d(None);

        let fbo = context.create_framebuffer()
            .map_err(|e| Error::AllocationFailed(format!("framebuffer: {}", e)))?;
        *framebuffer = Some(fbo);

        context.bind_framebuffer(FramebufferTarget::Framebuffer, fbo);
        context.attach_color_texture(Some(texture));

        let status = context.check_framebuffer_status();
        if !status.is_complete() {
            return Err(Error::IncompleteFramebuffer(status));
        }

        Ok(())
    }

    fn release_color_buffer(context: &dyn GraphicsContext, texture: TextureId) {
        context.active_texture(0);
        context.bind_texture_2d(None);
        context.delete_texture(texture);
    }

    fn release_framebuffer(context: &dyn GraphicsContext, framebuffer: FramebufferId) {
        if context.current_framebuffer() == framebuffer {
            context.bind_framebuffer(FramebufferTarget::Framebuffer, FramebufferId::DEFAULT);
        }
        context.delete_framebuffer(framebuffer);
    }

    /// Release the owned texture and framebuffer
    ///
    /// Each object is released independently. Safe to call on an invalid
    /// surface and any number of times. A binding saved by `begin_draw` is
    /// kept for the matching `end_draw`.
    pub fn destroy(&mut self) {
        if let Some(context) = self.context.take() {
            if let Some(texture) = self.color_buffer.take() {
                Self::release_color_buffer(context.as_ref(), texture);
            }
            if let Some(fbo) = self.framebuffer.take() {
                Self::release_framebuffer(context.as_ref(), fbo);
            }
            engine_debug!(LOG_SOURCE,
                "Destroyed {}x{} offscreen surface", self.buffer_width, self.buffer_height);
        }
        self.color_buffer = None;
        self.framebuffer = None;
        self.buffer_width = 0;
        self.buffer_height = 0;
    }

    // ===== DRAWING =====

    /// Bind this surface as the draw target
    ///
    /// `restore_target` forces the binding restored by `end_draw`; with
    /// `None` the currently bound framebuffer is queried and saved. Does
    /// nothing on an invalid surface. Must be paired with `end_draw`.
    pub fn begin_draw(&mut self, restore_target: Option<FramebufferId>) {
        let (Some(context), Some(fbo)) = (self.context.as_ref(), self.framebuffer) else {
            return;
        };

        if let Some(pending) = &self.saved_binding {
            engine_warn!(LOG_SOURCE,
                "begin_draw on framebuffer {:?} while already drawing; dropping restore target {:?}",
                fbo, pending.framebuffer);
        }

        let restore = restore_target.unwrap_or_else(|| context.current_framebuffer());
        context.bind_framebuffer(FramebufferTarget::Framebuffer, fbo);
        self.saved_binding = Some(SavedBinding {
            context: Rc::clone(context),
            framebuffer: restore,
        });
    }

    /// Restore the binding saved by `begin_draw`
    ///
    /// Restores even if the surface was destroyed since `begin_draw`.
    pub fn end_draw(&mut self) {
        let Some(saved) = self.saved_binding.take() else {
            return;
        };
        saved.context.bind_framebuffer(FramebufferTarget::Framebuffer, saved.framebuffer);
    }

    /// Clear the color buffer of the currently bound framebuffer
    ///
    /// Performs no binding; call between `begin_draw` and `end_draw`.
    pub fn clear(&self, r: f32, g: f32, b: f32, a: f32) {
        if let Some(context) = &self.context {
            context.clear_color(r, g, b, a);
            context.clear(ClearMask::COLOR);
        }
    }

    /// Blit the whole of `source` into the whole of `destination`
    ///
    /// Color only, nearest filtering, stretched when sizes differ. The
    /// framebuffer bound on entry is bound again on return. Absent or
    /// invalid surfaces make this a no-op without touching the context.
    ///
    /// # Errors
    ///
    /// `UnsupportedCapability` if the context cannot blit between
    /// framebuffers (needs OpenGL 3.0 / OpenGL ES 3.0). Nothing is bound.
    pub fn copy_buffer(
        context: &dyn GraphicsContext,
        source: Option<&OffscreenSurface>,
        destination: Option<&OffscreenSurface>,
    ) -> Result<()> {
        let (Some(source), Some(destination)) = (source, destination) else {
            return Ok(());
        };
        let (Some(read_fbo), Some(draw_fbo)) = (source.framebuffer, destination.framebuffer) else {
            return Ok(());
        };

        let version = context.version();
        if !version.supports_framebuffer_blit() {
            return Err(engine_err!(LOG_SOURCE, UnsupportedCapability,
                "copy_buffer needs framebuffer blit (OpenGL 3.0 / OpenGL ES 3.0), context is {}",
                version));
        }

        let previous = context.current_framebuffer();

        context.bind_framebuffer(FramebufferTarget::Read, read_fbo);
        context.bind_framebuffer(FramebufferTarget::Draw, draw_fbo);
        context.blit_framebuffer(
            Rect2D::from_size(source.buffer_width, source.buffer_height),
            Rect2D::from_size(destination.buffer_width, destination.buffer_height),
            ClearMask::COLOR,
            TextureFilter::Nearest,
        );

        context.bind_framebuffer(FramebufferTarget::Framebuffer, previous);
        Ok(())
    }

    // ===== ACCESSORS =====

    /// Framebuffer drawn into by this surface
    pub fn render_texture(&self) -> Option<FramebufferId> {
        self.framebuffer
    }

    /// Color texture sampled by later passes
    pub fn color_buffer(&self) -> Option<TextureId> {
        self.color_buffer
    }

    pub fn buffer_width(&self) -> u32 {
        self.buffer_width
    }

    pub fn buffer_height(&self) -> u32 {
        self.buffer_height
    }

    /// Context the surface was created against
    pub fn context(&self) -> Option<&Rc<dyn GraphicsContext>> {
        self.context.as_ref()
    }

    /// Whether the surface owns a framebuffer
    pub fn is_valid(&self) -> bool {
        self.framebuffer.is_some()
    }

    /// Binding `end_draw` will restore (only between begin and end)
    pub fn saved_binding(&self) -> Option<FramebufferId> {
        self.saved_binding.as_ref().map(|saved| saved.framebuffer)
    }

    /// Whether the allocated buffer has exactly this size
    pub fn is_same_size(&self, width: u32, height: u32) -> bool {
        self.buffer_width == width && self.buffer_height == height
    }
}

impl Default for OffscreenSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTarget for OffscreenSurface {
    fn set_offscreen_index(&mut self, index: Option<u32>) {
        self.offscreen_index = index;
    }

    fn offscreen_index(&self) -> Option<u32> {
        self.offscreen_index
    }

    fn set_previous_surface(&mut self, surface: Option<SurfaceKey>) {
        self.previous_surface = surface;
    }

    fn previous_surface(&self) -> Option<SurfaceKey> {
        self.previous_surface
    }

    fn set_parent_surface(&mut self, surface: Option<SurfaceKey>) {
        self.parent_surface = surface;
    }

    fn parent_surface(&self) -> Option<SurfaceKey> {
        self.parent_surface
    }
}

impl Drop for OffscreenSurface {
    fn drop(&mut self) {
        if self.saved_binding.is_some() {
            engine_warn!(LOG_SOURCE,
                "Offscreen surface dropped between begin_draw and end_draw");
        }
        self.destroy();
    }
}

#[cfg(test)]
#[path = "offscreen_surface_tests.rs"]
mod tests;
