use std::sync::Arc;

use crate::foundation::core::{FrameRGBA, TickIndex};
use crate::foundation::error::SimvisError;
use crate::scene::Scene;

/// Redraw target driven by the playback controller.
pub trait FrameView {
    /// Show `tick`. Called once per tick change.
    fn redraw(&mut self, tick: TickIndex);
}

/// Renders the scene on every redraw and keeps the latest result.
///
/// Render failures are logged and kept, never propagated: the interactive session must stay
/// usable when a single tick cannot be drawn.
pub struct SceneView {
    scene: Arc<dyn Scene>,
    annotate_frame_number: bool,
    last_tick: Option<TickIndex>,
    last_frame: Option<FrameRGBA>,
    last_error: Option<SimvisError>,
    redraws: u64,
}

impl SceneView {
    /// View without the frame-number overlay.
    pub fn new(scene: Arc<dyn Scene>) -> Self {
        Self {
            scene,
            annotate_frame_number: false,
            last_tick: None,
            last_frame: None,
            last_error: None,
            redraws: 0,
        }
    }

    /// Stamp the tick number on every redraw.
    pub fn with_frame_number(mut self, on: bool) -> Self {
        self.annotate_frame_number = on;
        self
    }

    /// Tick of the most recent redraw, successful or not.
    pub fn last_tick(&self) -> Option<TickIndex> {
        self.last_tick
    }

    /// Most recent successfully rendered frame.
    pub fn last_frame(&self) -> Option<&FrameRGBA> {
        self.last_frame.as_ref()
    }

    /// Error of the most recent redraw, cleared by the next success.
    pub fn last_error(&self) -> Option<&SimvisError> {
        self.last_error.as_ref()
    }

    /// Number of redraw calls so far.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}

impl FrameView for SceneView {
    fn redraw(&mut self, tick: TickIndex) {
        self.redraws += 1;
        self.last_tick = Some(tick);
        match self.scene.render_tick(tick, self.annotate_frame_number) {
            Ok(frame) => {
                self.last_frame = Some(frame);
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(tick = tick.0, error = %e, "redraw failed");
                self.last_error = Some(e);
            }
        }
    }
}

/// Records redraw ticks without rendering.
#[derive(Debug, Default)]
pub struct RecordingView {
    /// Redrawn ticks in call order.
    pub ticks: Vec<TickIndex>,
}

impl FrameView for RecordingView {
    fn redraw(&mut self, tick: TickIndex) {
        self.ticks.push(tick);
    }
}
