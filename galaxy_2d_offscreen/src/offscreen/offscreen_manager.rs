/// Offscreen surface pool.
///
/// Owns every offscreen surface of a renderer and hands out `SurfaceKey`
/// handles. The pass scheduler acquires a surface for a mask or part pass,
/// draws through it and releases it; released surfaces of the same size are
/// reused by later passes and destroyed once they stay idle for too many
/// frames.

use std::rc::Rc;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use crate::error::Result;
use crate::graphics_context::GraphicsContext;
use crate::offscreen::offscreen_surface::OffscreenSurface;
use crate::offscreen::render_target::{RenderTarget, SurfaceKey};
use crate::utils::IndexAllocator;
use crate::{engine_debug, engine_err, engine_warn};

const LOG_SOURCE: &str = "galaxy2d::OffscreenManager";

/// Pool behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffscreenManagerConfig {
    /// Reuse an idle surface of identical size instead of allocating (default: true)
    pub reuse_same_size: bool,
    /// Frames an idle surface survives before `end_frame` destroys it (default: 1)
    pub max_idle_frames: u32,
}

impl Default for OffscreenManagerConfig {
    fn default() -> Self {
        Self {
            reuse_same_size: true,
            max_idle_frames: 1,
        }
    }
}

struct PooledSurface {
    surface: OffscreenSurface,
    in_use: bool,
    last_used_frame: u64,
}

/// Offscreen surface pool
pub struct OffscreenManager {
    context: Rc<dyn GraphicsContext>,
    config: OffscreenManagerConfig,
    surfaces: SlotMap<SurfaceKey, PooledSurface>,
    /// Idle surfaces bucketed by (width, height)
    idle_by_size: FxHashMap<(u32, u32), Vec<SurfaceKey>>,
    indices: IndexAllocator,
    /// Surfaces between begin_draw and end_draw, innermost last
    drawing: Vec<SurfaceKey>,
    frame: u64,
}

impl OffscreenManager {
    /// Create an empty pool with the default configuration
    pub fn new(context: Rc<dyn GraphicsContext>) -> Self {
        Self::with_config(context, OffscreenManagerConfig::default())
    }

    /// Create an empty pool
    pub fn with_config(context: Rc<dyn GraphicsContext>, config: OffscreenManagerConfig) -> Self {
        Self {
            context,
            config,
            surfaces: SlotMap::with_key(),
            idle_by_size: FxHashMap::default(),
            indices: IndexAllocator::new(),
            drawing: Vec::new(),
            frame: 0,
        }
    }

    pub fn context(&self) -> &Rc<dyn GraphicsContext> {
        &self.context
    }

    pub fn config(&self) -> &OffscreenManagerConfig {
        &self.config
    }

    // ===== ACQUIRE / RELEASE =====

    /// Get a surface of the given size for exclusive use
    ///
    /// Reuses an idle surface of identical size when allowed, otherwise
    /// creates one while keeping the currently bound framebuffer. The
    /// surface gets the lowest free offscreen index.
    ///
    /// # Errors
    ///
    /// Propagates the creation error; the pool is left unchanged.
    pub fn acquire(&mut self, width: u32, height: u32) -> Result<SurfaceKey> {
        if self.config.reuse_same_size {
            if let Some(key) = self.take_idle(width, height) {
                let index = self.indices.acquire();
                if let Some(pooled) = self.surfaces.get_mut(key) {
                    pooled.in_use = true;
                    pooled.last_used_frame = self.frame;
                    pooled.surface.set_offscreen_index(Some(index));
                }
                return Ok(key);
            }
        }

        let mut surface = OffscreenSurface::new();
        surface.create(&self.context, width, height, self.context.current_framebuffer())?;

        let index = self.indices.acquire();
        surface.set_offscreen_index(Some(index));
        let key = self.surfaces.insert(PooledSurface {
            surface,
            in_use: true,
            last_used_frame: self.frame,
        });

        engine_debug!(LOG_SOURCE,
            "Pool grew to {} surfaces ({}x{} at index {})",
            self.surfaces.len(), width, height, index);

        Ok(key)
    }

    fn take_idle(&mut self, width: u32, height: u32) -> Option<SurfaceKey> {
        let bucket = self.idle_by_size.get_mut(&(width, height))?;
        let key = bucket.pop();
        if bucket.is_empty() {
            self.idle_by_size.remove(&(width, height));
        }
        key
    }

    /// Return a surface to the pool
    ///
    /// Frees its offscreen index and clears its previous/parent links.
    /// Unknown or already released keys are ignored.
    pub fn release(&mut self, key: SurfaceKey) {
        if self.drawing.contains(&key) {
            engine_warn!(LOG_SOURCE, "Releasing surface {:?} before end_draw", key);
        }
        let Some(pooled) = self.surfaces.get_mut(key) else {
            engine_warn!(LOG_SOURCE, "release: unknown surface {:?}", key);
            return;
        };
        if !pooled.in_use {
            return;
        }

        pooled.in_use = false;
        pooled.last_used_frame = self.frame;
        if let Some(index) = pooled.surface.offscreen_index() {
            self.indices.release(index);
        }
        pooled.surface.set_offscreen_index(None);
        pooled.surface.set_previous_surface(None);
        pooled.surface.set_parent_surface(None);

        let size = (pooled.surface.buffer_width(), pooled.surface.buffer_height());
        self.idle_by_size.entry(size).or_default().push(key);
    }

    /// Destroy a surface and forget its key
    ///
    /// Returns false if the key is unknown.
    pub fn remove(&mut self, key: SurfaceKey) -> bool {
        let Some(pooled) = self.surfaces.remove(key) else {
            return false;
        };
        if pooled.in_use {
            if let Some(index) = pooled.surface.offscreen_index() {
                self.indices.release(index);
            }
        } else {
            let size = (pooled.surface.buffer_width(), pooled.surface.buffer_height());
            if let Some(bucket) = self.idle_by_size.get_mut(&size) {
                bucket.retain(|k| *k != key);
                if bucket.is_empty() {
                    self.idle_by_size.remove(&size);
                }
            }
        }
        self.drawing.retain(|k| *k != key);
        true
    }

    /// Destroy every surface
    pub fn clear(&mut self) {
        self.drawing.clear();
        self.idle_by_size.clear();
        self.indices.reset();
        self.surfaces.clear();
    }

    // ===== FRAMES =====

    /// Start a new frame
    pub fn begin_frame(&mut self) {
        self.frame += 1;
    }

    /// Finish the frame and destroy surfaces idle for more than
    /// `max_idle_frames` frames
    ///
    /// Returns the number of destroyed surfaces.
    pub fn end_frame(&mut self) -> usize {
        let frame = self.frame;
        let max_idle = u64::from(self.config.max_idle_frames);
        let stale: Vec<SurfaceKey> = self.surfaces.iter()
            .filter(|(_, p)| !p.in_use && frame - p.last_used_frame > max_idle)
            .map(|(key, _)| key)
            .collect();

        for key in &stale {
            self.remove(*key);
        }
        if !stale.is_empty() {
            engine_debug!(LOG_SOURCE,
                "Released {} stale surfaces, {} left", stale.len(), self.surfaces.len());
        }
        stale.len()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    // ===== DRAWING =====

    /// Bind a surface for drawing
    ///
    /// Its previous-surface link is set to the pool surface drawing when the
    /// call is made (`None` when drawing started from outside the pool).
    ///
    /// # Errors
    ///
    /// `InvalidResource` if the key is unknown or the surface was released.
    pub fn begin_draw(&mut self, key: SurfaceKey) -> Result<()> {
        let previous = self.drawing.last().copied();
        let pooled = match self.surfaces.get_mut(key) {
            Some(pooled) if pooled.in_use => pooled,
            Some(_) => {
                return Err(engine_err!(LOG_SOURCE, InvalidResource,
                    "begin_draw on released surface {:?}", key));
            }
            None => {
                return Err(engine_err!(LOG_SOURCE, InvalidResource,
                    "begin_draw on unknown surface {:?}", key));
            }
        };

        pooled.surface.set_previous_surface(previous);
        pooled.surface.begin_draw(None);
        self.drawing.push(key);
        Ok(())
    }

    /// Restore the binding that was active before `begin_draw(key)`
    ///
    /// # Errors
    ///
    /// `InvalidResource` if the key is unknown.
    pub fn end_draw(&mut self, key: SurfaceKey) -> Result<()> {
        let Some(pooled) = self.surfaces.get_mut(key) else {
            return Err(engine_err!(LOG_SOURCE, InvalidResource,
                "end_draw on unknown surface {:?}", key));
        };

        match self.drawing.iter().rposition(|k| *k == key) {
            Some(position) => {
                if position + 1 != self.drawing.len() {
                    engine_warn!(LOG_SOURCE,
                        "end_draw on {:?} while {} nested surfaces are still drawing",
                        key, self.drawing.len() - position - 1);
                }
                self.drawing.remove(position);
            }
            None => {
                engine_warn!(LOG_SOURCE, "end_draw on {:?} without begin_draw", key);
            }
        }

        pooled.surface.end_draw();
        Ok(())
    }

    /// Blit the color buffer of `source` into `destination`
    ///
    /// Unknown keys make this a no-op.
    pub fn copy(&self, source: SurfaceKey, destination: SurfaceKey) -> Result<()> {
        OffscreenSurface::copy_buffer(
            self.context.as_ref(),
            self.surface(source),
            self.surface(destination),
        )
    }

    // ===== CHAINS =====

    /// Surfaces reached by following previous-surface links from `key`
    pub fn previous_chain(&self, key: SurfaceKey) -> Vec<SurfaceKey> {
        self.walk(key, "previous", |surface| surface.previous_surface())
    }

    /// Surfaces reached by following parent-surface links from `key`
    pub fn parent_chain(&self, key: SurfaceKey) -> Vec<SurfaceKey> {
        self.walk(key, "parent", |surface| surface.parent_surface())
    }

    fn walk(
        &self,
        start: SurfaceKey,
        link: &str,
        next: impl Fn(&OffscreenSurface) -> Option<SurfaceKey>,
    ) -> Vec<SurfaceKey> {
        let mut chain = Vec::new();
        let mut current = self.surfaces.get(start).and_then(|p| next(&p.surface));

        while let Some(key) = current {
            // An acyclic chain can't be longer than the pool
            if chain.len() >= self.surfaces.len() {
                engine_warn!(LOG_SOURCE,
                    "{} links from {:?} loop; stopped after {} surfaces",
                    link, start, chain.len());
                break;
            }
            let Some(pooled) = self.surfaces.get(key) else {
                break;
            };
            chain.push(key);
            current = next(&pooled.surface);
        }

        chain
    }

    // ===== ACCESSORS =====

    pub fn surface(&self, key: SurfaceKey) -> Option<&OffscreenSurface> {
        self.surfaces.get(key).map(|p| &p.surface)
    }

    pub fn surface_mut(&mut self, key: SurfaceKey) -> Option<&mut OffscreenSurface> {
        self.surfaces.get_mut(key).map(|p| &mut p.surface)
    }

    /// Number of surfaces owned by the pool (in use + idle)
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Number of acquired surfaces
    ///
    /// Every acquired surface holds exactly one offscreen index.
    pub fn in_use_count(&self) -> usize {
        self.indices.in_use() as usize
    }

    pub fn is_in_use(&self, key: SurfaceKey) -> bool {
        self.surfaces.get(key).is_some_and(|p| p.in_use)
    }

    /// Keys of all owned surfaces
    pub fn keys(&self) -> Vec<SurfaceKey> {
        self.surfaces.keys().collect()
    }
}

#[cfg(test)]
#[path = "offscreen_manager_tests.rs"]
mod tests;
