/// Mock GraphicsContext for unit tests (no GPU required)
///
/// Emulates GL binding state (draw/read framebuffer, attachments, object
/// lifetimes), records every call and lets tests inject allocation and
/// completeness failures.

use std::cell::RefCell;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::graphics_context::{
    GraphicsContext, ContextVersion, TextureId, FramebufferId, FramebufferTarget,
    FramebufferStatus, TextureWrap, TextureFilter, ClearMask, Rect2D,
};
use crate::error::Result;
use crate::engine_bail;

// ============================================================================
// Recorded calls
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ContextCall {
    Version,
    CreateTexture,
    DeleteTexture(TextureId),
    ActiveTexture(u32),
    BindTexture2D(Option<TextureId>),
    TexImage2D { width: u32, height: u32 },
    TextureWrap(TextureWrap),
    TextureFilter(TextureFilter),
    CreateFramebuffer,
    DeleteFramebuffer(FramebufferId),
    BindFramebuffer(FramebufferTarget, FramebufferId),
    AttachColorTexture(Option<TextureId>),
    CheckFramebufferStatus,
    CurrentFramebuffer,
    ClearColor([f32; 4]),
    Clear(ClearMask),
    Blit { src: Rect2D, dst: Rect2D, mask: ClearMask, filter: TextureFilter },
}

impl ContextCall {
    /// Whether the call changes a framebuffer binding
    pub fn is_framebuffer_bind(&self) -> bool {
        matches!(self, ContextCall::BindFramebuffer(..))
    }
}

// ============================================================================
// Mock state
// ============================================================================

#[derive(Debug)]
struct MockState {
    version: ContextVersion,
    calls: Vec<ContextCall>,
    next_name: u32,
    live_textures: FxHashSet<TextureId>,
    live_framebuffers: FxHashSet<FramebufferId>,
    attachments: FxHashMap<FramebufferId, TextureId>,
    textures_created: u32,
    textures_deleted: u32,
    framebuffers_created: u32,
    framebuffers_deleted: u32,
    draw_binding: FramebufferId,
    read_binding: FramebufferId,
    bound_texture: Option<TextureId>,
    fail_texture_creation: bool,
    fail_framebuffer_creation: bool,
    forced_status: Option<FramebufferStatus>,
}

/// Mock context tracking GL-like state without a GPU
#[derive(Debug)]
pub struct MockGraphicsContext {
    state: RefCell<MockState>,
}

impl MockGraphicsContext {
    /// Create a desktop OpenGL 3.3 mock context
    pub fn new() -> Self {
        Self::with_version(ContextVersion::new(3, 3, false))
    }

    /// Create a mock context reporting the given version
    pub fn with_version(version: ContextVersion) -> Self {
        Self {
            state: RefCell::new(MockState {
                version,
                calls: Vec::new(),
                next_name: 1,
                live_textures: FxHashSet::default(),
                live_framebuffers: FxHashSet::default(),
                attachments: FxHashMap::default(),
                textures_created: 0,
                textures_deleted: 0,
                framebuffers_created: 0,
                framebuffers_deleted: 0,
                draw_binding: FramebufferId::DEFAULT,
                read_binding: FramebufferId::DEFAULT,
                bound_texture: None,
                fail_texture_creation: false,
                fail_framebuffer_creation: false,
                forced_status: None,
            }),
        }
    }

    // ----- Failure injection -----

    pub fn set_fail_texture_creation(&self, fail: bool) {
        self.state.borrow_mut().fail_texture_creation = fail;
    }

    pub fn set_fail_framebuffer_creation(&self, fail: bool) {
        self.state.borrow_mut().fail_framebuffer_creation = fail;
    }

    pub fn set_forced_status(&self, status: Option<FramebufferStatus>) {
        self.state.borrow_mut().forced_status = status;
    }

    // ----- Test setup -----

    /// Bind a framebuffer on both points without recording a call
    ///
    /// Simulates whatever the caller had bound before handing over.
    pub fn set_bound_framebuffer(&self, framebuffer: FramebufferId) {
        let mut state = self.state.borrow_mut();
        state.draw_binding = framebuffer;
        state.read_binding = framebuffer;
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    // ----- Inspection -----

    pub fn calls(&self) -> Vec<ContextCall> {
        self.state.borrow().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.borrow().calls.len()
    }

    pub fn bound_framebuffer(&self) -> FramebufferId {
        self.state.borrow().draw_binding
    }

    pub fn read_framebuffer(&self) -> FramebufferId {
        self.state.borrow().read_binding
    }

    pub fn bound_texture(&self) -> Option<TextureId> {
        self.state.borrow().bound_texture
    }

    pub fn live_texture_count(&self) -> usize {
        self.state.borrow().live_textures.len()
    }

    pub fn live_framebuffer_count(&self) -> usize {
        self.state.borrow().live_framebuffers.len()
    }

    pub fn is_texture_live(&self, texture: TextureId) -> bool {
        self.state.borrow().live_textures.contains(&texture)
    }

    pub fn is_framebuffer_live(&self, framebuffer: FramebufferId) -> bool {
        self.state.borrow().live_framebuffers.contains(&framebuffer)
    }

    pub fn textures_created(&self) -> u32 {
        self.state.borrow().textures_created
    }

    pub fn textures_deleted(&self) -> u32 {
        self.state.borrow().textures_deleted
    }

    pub fn framebuffers_created(&self) -> u32 {
        self.state.borrow().framebuffers_created
    }

    pub fn framebuffers_deleted(&self) -> u32 {
        self.state.borrow().framebuffers_deleted
    }

    fn record(&self, call: ContextCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl Default for MockGraphicsContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsContext for MockGraphicsContext {
    fn version(&self) -> ContextVersion {
        self.record(ContextCall::Version);
        self.state.borrow().version
    }

    fn create_texture(&self) -> Result<TextureId> {
        self.record(ContextCall::CreateTexture);
        let mut state = self.state.borrow_mut();
        if state.fail_texture_creation {
            engine_bail!("galaxy2d::mock", "create_texture: injected failure");
        }
        let texture = TextureId(state.next_name);
        state.next_name += 1;
        state.textures_created += 1;
        state.live_textures.insert(texture);
        Ok(texture)
    }

    fn delete_texture(&self, texture: TextureId) {
        self.record(ContextCall::DeleteTexture(texture));
        let mut state = self.state.borrow_mut();
        if state.live_textures.remove(&texture) {
            state.textures_deleted += 1;
        }
        if state.bound_texture == Some(texture) {
            state.bound_texture = None;
        }
    }

    fn active_texture(&self, unit: u32) {
        self.record(ContextCall::ActiveTexture(unit));
    }

    fn bind_texture_2d(&self, texture: Option<TextureId>) {
        self.record(ContextCall::BindTexture2D(texture));
        self.state.borrow_mut().bound_texture = texture;
    }

    fn tex_image_2d_rgba(&self, width: u32, height: u32) {
        self.record(ContextCall::TexImage2D { width, height });
    }

    fn set_texture_wrap(&self, wrap: TextureWrap) {
        self.record(ContextCall::TextureWrap(wrap));
    }

    fn set_texture_filter(&self, filter: TextureFilter) {
        self.record(ContextCall::TextureFilter(filter));
    }

    fn create_framebuffer(&self) -> Result<FramebufferId> {
        self.record(ContextCall::CreateFramebuffer);
        let mut state = self.state.borrow_mut();
        if state.fail_framebuffer_creation {
            engine_bail!("galaxy2d::mock", "create_framebuffer: injected failure");
        }
        let framebuffer = FramebufferId(state.next_name);
        state.next_name += 1;
        state.framebuffers_created += 1;
        state.live_framebuffers.insert(framebuffer);
        Ok(framebuffer)
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        self.record(ContextCall::DeleteFramebuffer(framebuffer));
        let mut state = self.state.borrow_mut();
        if state.live_framebuffers.remove(&framebuffer) {
            state.framebuffers_deleted += 1;
        }
        state.attachments.remove(&framebuffer);
        // GL reverts bindings of a deleted framebuffer to the default one
        if state.draw_binding == framebuffer {
            state.draw_binding = FramebufferId::DEFAULT;
        }
        if state.read_binding == framebuffer {
            state.read_binding = FramebufferId::DEFAULT;
        }
    }

    fn bind_framebuffer(&self, target: FramebufferTarget, framebuffer: FramebufferId) {
        self.record(ContextCall::BindFramebuffer(target, framebuffer));
        let mut state = self.state.borrow_mut();
        match target {
            FramebufferTarget::Framebuffer => {
                state.draw_binding = framebuffer;
                state.read_binding = framebuffer;
            }
            FramebufferTarget::Read => state.read_binding = framebuffer,
            FramebufferTarget::Draw => state.draw_binding = framebuffer,
        }
    }

    fn attach_color_texture(&self, texture: Option<TextureId>) {
        self.record(ContextCall::AttachColorTexture(texture));
        let mut state = self.state.borrow_mut();
        let framebuffer = state.draw_binding;
        match texture {
            Some(texture) => {
                state.attachments.insert(framebuffer, texture);
            }
            None => {
                state.attachments.remove(&framebuffer);
            }
        }
    }

    fn check_framebuffer_status(&self) -> FramebufferStatus {
        self.record(ContextCall::CheckFramebufferStatus);
        let state = self.state.borrow();
        if let Some(status) = state.forced_status {
            return status;
        }
        let framebuffer = state.draw_binding;
        if framebuffer.is_default() {
            return FramebufferStatus::Complete;
        }
        if !state.live_framebuffers.contains(&framebuffer) {
            return FramebufferStatus::Undefined;
        }
        match state.attachments.get(&framebuffer) {
            Some(texture) if state.live_textures.contains(texture) => FramebufferStatus::Complete,
            Some(_) => FramebufferStatus::IncompleteAttachment,
            None => FramebufferStatus::IncompleteMissingAttachment,
        }
    }

    fn current_framebuffer(&self) -> FramebufferId {
        self.record(ContextCall::CurrentFramebuffer);
        self.state.borrow().draw_binding
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(ContextCall::ClearColor([r, g, b, a]));
    }

    fn clear(&self, mask: ClearMask) {
        self.record(ContextCall::Clear(mask));
    }

    fn blit_framebuffer(&self, src: Rect2D, dst: Rect2D, mask: ClearMask, filter: TextureFilter) {
        self.record(ContextCall::Blit { src, dst, mask, filter });
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_graphics_context_tests.rs"]
mod tests;
