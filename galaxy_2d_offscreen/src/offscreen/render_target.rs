/// RenderTarget trait - chain bookkeeping shared by every offscreen variant
///
/// Mask and part managers walk chains of offscreen surfaces ("what was
/// active before me", "where does my result get merged"). They do it
/// through this trait so they never depend on a concrete GPU backend.

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a surface owned by an `OffscreenManager`
    ///
    /// Keys are non-owning: a key whose surface was removed resolves to
    /// `None` instead of dangling.
    pub struct SurfaceKey;
}

/// Render target chain contract
///
/// Carries no GPU behavior. The links are plain handles maintained by the
/// pool or the pass scheduler; nothing here prevents a caller from building
/// a cycle (A's parent is B, B's parent is A).
pub trait RenderTarget {
    /// Set the pool-assigned slot (`None` = unassigned)
    fn set_offscreen_index(&mut self, index: Option<u32>);

    /// Pool-assigned slot, `None` until the owning pool assigns one
    fn offscreen_index(&self) -> Option<u32>;

    /// Link the surface that was bound right before this one (`None` clears)
    fn set_previous_surface(&mut self, surface: Option<SurfaceKey>);

    fn previous_surface(&self) -> Option<SurfaceKey>;

    /// Link the offscreen of the parent part (`None` clears)
    fn set_parent_surface(&mut self, surface: Option<SurfaceKey>);

    fn parent_surface(&self) -> Option<SurfaceKey>;
}
