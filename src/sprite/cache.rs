use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::foundation::error::SimvisResult;
use crate::sprite::raster::{Sprite, rasterize};
use crate::vector::model::VectorDescription;

/// One slot per whole degree.
pub const ROTATION_SLOTS: usize = 360;

/// Scales closer than this reuse the cached bitmap.
pub const SCALE_EPSILON: f64 = 1e-7;

#[derive(Debug, Default)]
struct CacheSlot {
    rendered_at: Option<f64>,
    sprite: Option<Arc<Sprite>>,
}

impl CacheSlot {
    fn valid_for(&self, scale: f64) -> Option<&Arc<Sprite>> {
        let rendered_at = self.rendered_at?;
        if (scale - rendered_at).abs() > SCALE_EPSILON {
            return None;
        }
        self.sprite.as_ref()
    }
}

/// Counters of a [`SpriteCache`] since creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpriteCacheStats {
    /// Requests answered from a valid slot.
    pub hits: u64,
    /// Successful rasterizations.
    pub rebuilds: u64,
}

/// Rotation-indexed bitmap cache for a single vector description.
///
/// Each of the 360 slots remembers the scale it was rendered at. A request at a different
/// scale rebuilds only that slot; the other 359 keep their (possibly stale) bitmaps until they
/// are asked for. Slots are locked independently, so renders of different angles never wait on
/// each other.
pub struct SpriteCache {
    desc: Arc<VectorDescription>,
    slots: Box<[Mutex<CacheSlot>]>,
    hits: AtomicU64,
    rebuilds: AtomicU64,
}

impl SpriteCache {
    /// Create a cache with all slots empty. Nothing is rasterized until requested.
    pub fn new(desc: Arc<VectorDescription>) -> Self {
        let slots = (0..ROTATION_SLOTS)
            .map(|_| Mutex::new(CacheSlot::default()))
            .collect();
        Self {
            desc,
            slots,
            hits: AtomicU64::new(0),
            rebuilds: AtomicU64::new(0),
        }
    }

    /// Vector description every slot is rendered from.
    pub fn description(&self) -> &Arc<VectorDescription> {
        &self.desc
    }

    /// Slot for `angle_deg`, negative angles wrapping the way a compass would.
    pub fn slot_index(angle_deg: i32) -> usize {
        angle_deg.rem_euclid(ROTATION_SLOTS as i32) as usize
    }

    /// Bitmap of the description at `scale`, rotated by `angle_deg`.
    ///
    /// Returns the cached `Arc` while the slot's scale is within [`SCALE_EPSILON`]. A failed
    /// rebuild leaves the slot as it was.
    pub fn get_image(&self, scale: f64, angle_deg: i32) -> SimvisResult<Arc<Sprite>> {
        let idx = Self::slot_index(angle_deg);
        let mut slot = self.slots[idx]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(sprite) = slot.valid_for(scale) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(sprite));
        }

        tracing::debug!(
            slot = idx,
            scale,
            previous = ?slot.rendered_at,
            "rebuilding sprite slot"
        );
        let sprite = Arc::new(rasterize(&self.desc, scale, idx as i32)?);
        slot.rendered_at = Some(scale);
        slot.sprite = Some(Arc::clone(&sprite));
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        Ok(sprite)
    }

    /// Scale the slot for `angle_deg` was last rendered at, if any.
    pub fn rendered_scale(&self, angle_deg: i32) -> Option<f64> {
        self.slots[Self::slot_index(angle_deg)]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rendered_at
    }

    /// Number of slots holding a bitmap, regardless of scale.
    pub fn cached_slots(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| {
                s.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .sprite
                    .is_some()
            })
            .count()
    }

    /// Snapshot of the hit and rebuild counters.
    pub fn stats(&self) -> SpriteCacheStats {
        SpriteCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for SpriteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpriteCache")
            .field("cached_slots", &self.cached_slots())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
