/*!
# Galaxy 2D Offscreen - OpenGL Backend

OpenGL / OpenGL ES implementation of the Galaxy 2D offscreen `GraphicsContext`.

This crate wraps a `glow::Context` created by the host application and
forwards every texture, framebuffer, clear and blit call to it. Object names
are exchanged with the core crate as plain `u32` values, so surfaces created
through this backend can be handed to any other GL code sharing the context.

Native targets only: on the web glow hands out opaque JS handles.
*/

mod gl_context;

pub use gl_context::GlGraphicsContext;
