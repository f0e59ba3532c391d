/// Unit tests for gl_context.rs
///
/// Covers handle, enum and size conversions and error building. Calls into
/// GL need a live context and are exercised by the host application.

use super::*;
use std::sync::{Arc, Mutex};
use galaxy_2d_offscreen::galaxy2d::Engine;
use galaxy_2d_offscreen::galaxy2d::log::{Logger, LogEntry};

struct CountingLogger {
    count: Arc<Mutex<usize>>,
}

impl Logger for CountingLogger {
    fn log(&self, _entry: &LogEntry) {
        *self.count.lock().unwrap() += 1;
    }
}

#[test]
fn test_framebuffer_targets() {
    assert_eq!(gl_framebuffer_target(FramebufferTarget::Framebuffer), glow::FRAMEBUFFER);
    assert_eq!(gl_framebuffer_target(FramebufferTarget::Read), glow::READ_FRAMEBUFFER);
    assert_eq!(gl_framebuffer_target(FramebufferTarget::Draw), glow::DRAW_FRAMEBUFFER);
}

#[test]
fn test_framebuffer_status_known_codes() {
    assert_eq!(gl_framebuffer_status(glow::FRAMEBUFFER_COMPLETE), FramebufferStatus::Complete);
    assert_eq!(gl_framebuffer_status(glow::FRAMEBUFFER_UNDEFINED), FramebufferStatus::Undefined);
    assert_eq!(
        gl_framebuffer_status(glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT),
        FramebufferStatus::IncompleteAttachment
    );
    assert_eq!(
        gl_framebuffer_status(glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT),
        FramebufferStatus::IncompleteMissingAttachment
    );
    assert_eq!(gl_framebuffer_status(0x8CD9), FramebufferStatus::IncompleteDimensions);
    assert_eq!(gl_framebuffer_status(glow::FRAMEBUFFER_UNSUPPORTED), FramebufferStatus::Unsupported);
}

#[test]
fn test_framebuffer_status_unknown_code() {
    let status = gl_framebuffer_status(0x1234);
    assert_eq!(status, FramebufferStatus::Unknown(0x1234));
    assert!(!status.is_complete());
}

#[test]
fn test_texture_wrap() {
    assert_eq!(gl_texture_wrap(TextureWrap::ClampToEdge), glow::CLAMP_TO_EDGE as i32);
    assert_eq!(gl_texture_wrap(TextureWrap::Repeat), glow::REPEAT as i32);
    assert_eq!(gl_texture_wrap(TextureWrap::MirroredRepeat), glow::MIRRORED_REPEAT as i32);
}

#[test]
fn test_filters() {
    assert_eq!(gl_filter(TextureFilter::Nearest), glow::NEAREST);
    assert_eq!(gl_filter(TextureFilter::Linear), glow::LINEAR);
}

#[test]
fn test_clear_mask_bits() {
    assert_eq!(gl_clear_mask(ClearMask::COLOR), glow::COLOR_BUFFER_BIT);
    assert_eq!(gl_clear_mask(ClearMask::empty()), 0);
    assert_eq!(
        gl_clear_mask(ClearMask::all()),
        glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT | glow::STENCIL_BUFFER_BIT
    );
}

#[test]
fn test_default_framebuffer_has_no_native_handle() {
    assert!(native_framebuffer(FramebufferId::DEFAULT).is_none());
    assert!(native_framebuffer(FramebufferId(3)).is_some());
    assert!(native_texture(TextureId(0)).is_none());
}

#[test]
fn test_backend_error_is_built_without_logging() {
    let count = Arc::new(Mutex::new(0));
    Engine::set_logger(CountingLogger { count: count.clone() });

    let err = backend_error("glGenTextures", "out of memory".to_string());

    Engine::reset_logger();
    assert_eq!(err, Error::BackendError("glGenTextures failed: out of memory".to_string()));
    assert_eq!(*count.lock().unwrap(), 0);
}

#[test]
fn test_gl_size_saturates() {
    assert_eq!(gl_size(0), 0);
    assert_eq!(gl_size(1024), 1024);
    assert_eq!(gl_size(i32::MAX as u32), i32::MAX);
    assert_eq!(gl_size(u32::MAX), i32::MAX);
}
