//! Rasterized icon bitmaps and the rotation/scale keyed cache in front of them.

/// Rotation-slot sprite cache.
pub mod cache;
/// Named icon collections.
pub mod icons;
/// Vector description rasterizer.
pub mod raster;

pub use cache::{ROTATION_SLOTS, SCALE_EPSILON, SpriteCache, SpriteCacheStats};
pub use icons::IconSet;
pub use raster::{Sprite, rasterize, sprite_side};
