//! What gets drawn for a tick: recorded entities composited from cached sprites.

/// Frame-number overlay geometry.
pub mod overlay;
/// Recorded simulation data.
pub mod record;
/// Scene backed by sprite caches.
pub mod sprite_scene;
/// Redraw targets for the playback controller.
pub mod view;

use crate::foundation::core::{Canvas, FrameRGBA, TickIndex};
use crate::foundation::error::SimvisResult;

pub use overlay::frame_number_path;
pub use record::{EntityState, SimulationRecord, TickFrame};
pub use sprite_scene::{SceneOpts, SpriteScene, ZOOM_PRESETS};
pub use view::{FrameView, RecordingView, SceneView};

/// Renders whole frames by tick. Shared between the interactive thread and export workers.
pub trait Scene: Send + Sync {
    /// Output frame size.
    fn canvas(&self) -> Canvas;

    /// Last renderable tick.
    fn max_tick(&self) -> TickIndex;

    /// Simulated time between consecutive ticks.
    fn frame_duration_ms(&self) -> u64;

    /// Render `tick`, optionally stamping its number in the top-left corner.
    fn render_tick(&self, tick: TickIndex, annotate_frame_number: bool) -> SimvisResult<FrameRGBA>;
}

#[cfg(test)]
#[path = "../../tests/unit/scene/sprite_scene.rs"]
mod tests;
