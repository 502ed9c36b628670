use std::sync::atomic::{AtomicBool, Ordering};

use crate::export::encoder::{EncoderConfig, VideoEncoder};
use crate::export::progress::{PercentGate, Progress, ProgressSink};
use crate::foundation::core::TickIndex;
use crate::foundation::error::{SimvisError, SimvisResult};
use crate::scene::Scene;

/// Inclusive tick range to export plus output options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportRequest {
    /// First exported tick.
    pub first: TickIndex,
    /// Last exported tick, inclusive.
    pub last: TickIndex,
    /// Encoder quality, 0 is highest.
    pub quality: u8,
    /// Stamp each frame with its tick number.
    pub annotate_frame_number: bool,
}

impl ExportRequest {
    /// Whole record, highest quality.
    pub fn full(max_tick: TickIndex) -> Self {
        Self {
            first: TickIndex(0),
            last: max_tick,
            quality: 0,
            annotate_frame_number: false,
        }
    }

    /// Require `first <= last <= max_tick`.
    pub fn validate(&self, max_tick: TickIndex) -> SimvisResult<()> {
        if self.first > self.last {
            return Err(SimvisError::validation(format!(
                "export range is reversed: first {} > last {}",
                self.first.0, self.last.0
            )));
        }
        if self.last > max_tick {
            return Err(SimvisError::validation(format!(
                "export range ends at {} but the record ends at {}",
                self.last.0, max_tick.0
            )));
        }
        Ok(())
    }

    /// Number of ticks in the range.
    pub fn frame_count(&self) -> u64 {
        self.last.0.saturating_sub(self.first.0) + 1
    }

    /// Progress after `tick` was submitted. A single-frame range is complete at once.
    pub fn fraction_at(&self, tick: TickIndex) -> f64 {
        let span = self.last.0.saturating_sub(self.first.0);
        if span == 0 {
            return 1.0;
        }
        (tick.0.saturating_sub(self.first.0)) as f64 / span as f64
    }
}

/// Outcome of a finished export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Frames accepted by the encoder.
    pub frames_encoded: u64,
    /// `true` when the export stopped early on request.
    pub cancelled: bool,
}

/// Render and encode `req.first..=req.last` in order.
///
/// Frame `i` is stamped `(i - first) * frame_duration_ms`. Rendering of `i + 1` only starts after
/// `i` was accepted by the encoder. Any error ends the loop; `close` runs exactly once as soon as
/// `begin` was attempted. `cancel` is checked before each frame; `on_frame` is called after each
/// successful submission.
#[tracing::instrument(
    level = "info",
    skip_all,
    fields(first = req.first.0, last = req.last.0, quality = req.quality)
)]
pub fn run_export(
    scene: &dyn Scene,
    req: &ExportRequest,
    encoder: &mut dyn VideoEncoder,
    progress: &mut dyn ProgressSink,
    cancel: &AtomicBool,
    mut on_frame: impl FnMut(TickIndex),
) -> SimvisResult<ExportStats> {
    req.validate(scene.max_tick())?;

    let canvas = scene.canvas();
    let cfg = EncoderConfig {
        width: canvas.width,
        height: canvas.height,
        quality: req.quality,
        frame_duration_ms: scene.frame_duration_ms(),
    };

    tracing::info!(frames = req.frame_count(), "export started");
    progress.report(Progress::started());

    let result = encode_range(scene, req, cfg, encoder, progress, cancel, &mut on_frame);
    let closed = encoder.close();

    match (result, closed) {
        (Ok(stats), Ok(())) => {
            tracing::info!(
                frames = stats.frames_encoded,
                cancelled = stats.cancelled,
                "export finished"
            );
            Ok(stats)
        }
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            tracing::warn!(error = %close_err, "encoder close failed after an earlier error");
            Err(e)
        }
    }
}

fn encode_range(
    scene: &dyn Scene,
    req: &ExportRequest,
    cfg: EncoderConfig,
    encoder: &mut dyn VideoEncoder,
    progress: &mut dyn ProgressSink,
    cancel: &AtomicBool,
    on_frame: &mut dyn FnMut(TickIndex),
) -> SimvisResult<ExportStats> {
    encoder.begin(cfg)?;

    let mut gate = PercentGate::new();
    let mut stats = ExportStats::default();
    for i in req.first.0..=req.last.0 {
        if cancel.load(Ordering::Relaxed) {
            tracing::info!(tick = i, "export cancelled");
            stats.cancelled = true;
            break;
        }
        let tick = TickIndex(i);
        let frame = scene.render_tick(tick, req.annotate_frame_number)?;
        let timestamp_ms = (i - req.first.0)
            .checked_mul(cfg.frame_duration_ms)
            .ok_or_else(|| SimvisError::validation("export timestamp overflows u64"))?;
        encoder.encode_frame(&frame, timestamp_ms)?;
        stats.frames_encoded += 1;
        on_frame(tick);

        if let Some(p) = gate.offer(req.fraction_at(tick)) {
            progress.report(p);
        }
    }
    Ok(stats)
}
