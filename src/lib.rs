//! Simvis renders recorded simulations of vector icons, interactively or to video.
//!
//! - Load [`VectorDescription`]s into an [`IconSet`]; each icon owns a [`SpriteCache`] of 360
//!   rotation slots, rebuilt lazily when the requested scale changes
//! - Wrap a [`SimulationRecord`] in a [`SpriteScene`]
//! - Drive it with a [`PlaybackController`], or stream a tick range into a [`VideoEncoder`] with
//!   [`run_export`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
pub(crate) mod render;

/// Tick range export and video encoders.
pub mod export;
/// Interactive playback and background export control.
pub mod playback;
/// Scenes: what a tick looks like.
pub mod scene;
/// Icon rasterization and the sprite cache.
pub mod sprite;
/// Vector icon descriptions.
pub mod vector;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, FrameRGBA, Point, Rect, Rgb, TickIndex, Vec2,
};
pub use crate::foundation::error::{SimvisError, SimvisResult};

pub use crate::export::{
    EncoderConfig, ExportRequest, ExportStats, FfmpegEncoder, FfmpegEncoderOpts, InMemoryEncoder,
    LogProgress, Progress, ProgressSink, VideoEncoder, is_ffmpeg_on_path, run_export,
};
pub use crate::playback::{
    CLOCK_RATES_MS, PlaybackClock, PlaybackController, PlaybackOpts, PlaybackState, StepOutcome,
};
pub use crate::scene::{
    EntityState, FrameView, RecordingView, Scene, SceneOpts, SceneView, SimulationRecord,
    SpriteScene, TickFrame, ZOOM_PRESETS, frame_number_path,
};
pub use crate::sprite::{
    IconSet, ROTATION_SLOTS, SCALE_EPSILON, Sprite, SpriteCache, SpriteCacheStats, rasterize,
};
pub use crate::vector::{
    CoordinateSystem, Fill, IndexedColor, Palette, Shape, ShapeItem, VectorDescription,
};
