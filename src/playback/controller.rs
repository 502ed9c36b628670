use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::export::encoder::VideoEncoder;
use crate::export::progress::ProgressSink;
use crate::export::run::{ExportRequest, ExportStats, run_export};
use crate::foundation::core::TickIndex;
use crate::foundation::error::{SimvisError, SimvisResult};
use crate::playback::clock::{PlaybackClock, PlaybackOpts};
use crate::scene::Scene;
use crate::scene::view::FrameView;

/// What the controller is currently doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// Showing a fixed tick.
    Idle,
    /// Advancing one tick per clock pulse.
    Playing {
        /// Pulse interval.
        interval_ms: u64,
    },
    /// Feeding a tick range to an encoder on a background thread.
    Exporting {
        /// First exported tick.
        first: TickIndex,
        /// Last exported tick, inclusive.
        last: TickIndex,
        /// Last tick handed to the encoder, `first` before any.
        current: TickIndex,
    },
}

/// Result of [`PlaybackController::advance_by_step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The tick moved by the full step.
    Advanced,
    /// The step would leave `[0, max_tick]`; the tick sits at the boundary and playback stopped.
    BoundaryReached,
}

enum ExportEvent {
    Rendered(TickIndex),
    Finished(SimvisResult<ExportStats>),
}

struct ExportJob {
    first: TickIndex,
    last: TickIndex,
    current: TickIndex,
    cancel: Arc<AtomicBool>,
    events: Receiver<ExportEvent>,
}

/// Owner of the current tick and of the playback/export mode.
///
/// All methods run on the interactive thread. Clock pulses and export progress arrive over
/// channels and are applied by [`PlaybackController::pump`] (or
/// [`PlaybackController::wait_for_export`]), so the interactive thread never blocks on the clock
/// or the encoder.
pub struct PlaybackController<V: FrameView> {
    scene: Arc<dyn Scene>,
    view: V,
    tick: TickIndex,
    interval_ms: u64,
    clock: Option<PlaybackClock>,
    export: Option<ExportJob>,
    export_result: Option<SimvisResult<ExportStats>>,
}

impl<V: FrameView> PlaybackController<V> {
    /// Controller at tick 0, idle. Draws tick 0 once.
    pub fn new(scene: Arc<dyn Scene>, view: V, opts: PlaybackOpts) -> SimvisResult<Self> {
        if opts.interval_ms == 0 {
            return Err(SimvisError::validation("clock interval must be > 0 ms"));
        }
        let mut ctl = Self {
            scene,
            view,
            tick: TickIndex(0),
            interval_ms: opts.interval_ms,
            clock: None,
            export: None,
            export_result: None,
        };
        ctl.view.redraw(ctl.tick);
        Ok(ctl)
    }

    /// Tick shown interactively.
    pub fn tick(&self) -> TickIndex {
        self.tick
    }

    /// Last tick of the scene.
    pub fn max_tick(&self) -> TickIndex {
        self.scene.max_tick()
    }

    /// Playback interval used by the next `start`.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Redraw target.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable redraw target.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Current mode.
    pub fn state(&self) -> PlaybackState {
        if let Some(job) = &self.export {
            return PlaybackState::Exporting {
                first: job.first,
                last: job.last,
                current: job.current,
            };
        }
        if self.clock.is_some() {
            return PlaybackState::Playing {
                interval_ms: self.interval_ms,
            };
        }
        PlaybackState::Idle
    }

    /// Move to `target`, clamped into `[0, max_tick]`, and redraw once.
    pub fn jump(&mut self, target: i64) -> TickIndex {
        self.tick = TickIndex::clamped(target, self.max_tick());
        self.view.redraw(self.tick);
        self.tick
    }

    /// Move by `delta` ticks.
    ///
    /// A step that would leave `[0, max_tick]` lands on the boundary, stops playback and reports
    /// [`StepOutcome::BoundaryReached`].
    pub fn advance_by_step(&mut self, delta: i64) -> StepOutcome {
        match self.tick.checked_step(delta, self.max_tick()) {
            Some(next) => {
                self.tick = next;
                self.view.redraw(next);
                StepOutcome::Advanced
            }
            None => {
                let edge = if delta < 0 {
                    TickIndex(0)
                } else {
                    self.max_tick()
                };
                if edge != self.tick {
                    self.tick = edge;
                    self.view.redraw(edge);
                }
                self.stop();
                StepOutcome::BoundaryReached
            }
        }
    }

    /// Start interactive playback at the current interval. No-op when already playing.
    pub fn start(&mut self) -> SimvisResult<()> {
        if self.export.is_some() {
            return Err(SimvisError::validation(
                "cannot start playback while an export is running",
            ));
        }
        if self.clock.is_none() {
            self.clock = Some(PlaybackClock::start(self.interval_ms)?);
            tracing::debug!(interval_ms = self.interval_ms, tick = self.tick.0, "playback started");
        }
        Ok(())
    }

    /// Stop interactive playback. No-op when idle.
    pub fn stop(&mut self) {
        if self.clock.take().is_some() {
            tracing::debug!(tick = self.tick.0, "playback stopped");
        }
    }

    /// Change the playback interval. A running clock picks it up on its next pulse.
    pub fn set_clock_rate(&mut self, interval_ms: u64) -> SimvisResult<()> {
        if interval_ms == 0 {
            return Err(SimvisError::validation("clock interval must be > 0 ms"));
        }
        self.interval_ms = interval_ms;
        if let Some(clock) = &self.clock {
            clock.set_interval_ms(interval_ms);
        }
        Ok(())
    }

    /// Apply pending clock pulses and export events. Returns how many were processed.
    pub fn pump(&mut self) -> usize {
        let mut n = 0;
        while self.clock.as_ref().is_some_and(PlaybackClock::try_pulse) {
            n += 1;
            if self.advance_by_step(1) == StepOutcome::BoundaryReached {
                break;
            }
        }
        while let Some(event) = self.next_export_event(false) {
            n += 1;
            self.apply_export_event(event);
        }
        n
    }

    /// Render `req` on a background thread and feed `encoder`.
    ///
    /// Stops playback first. The outcome is available from [`Self::take_export_result`] once the
    /// `Finished` event was applied.
    pub fn begin_export(
        &mut self,
        req: ExportRequest,
        mut encoder: Box<dyn VideoEncoder>,
        mut progress: Box<dyn ProgressSink>,
    ) -> SimvisResult<()> {
        if self.export.is_some() {
            return Err(SimvisError::validation("an export is already running"));
        }
        req.validate(self.max_tick())?;
        self.stop();

        let (tx, rx) = mpsc::channel::<ExportEvent>();
        let cancel = Arc::new(AtomicBool::new(false));
        let thread_cancel = Arc::clone(&cancel);
        let scene = Arc::clone(&self.scene);

        std::thread::Builder::new()
            .name("simvis-export".to_string())
            .spawn(move || {
                let result = run_export(
                    &*scene,
                    &req,
                    &mut *encoder,
                    &mut *progress,
                    &thread_cancel,
                    |tick| {
                        // The controller may be gone; the export still runs to completion.
                        let _ = tx.send(ExportEvent::Rendered(tick));
                    },
                );
                let _ = tx.send(ExportEvent::Finished(result));
            })
            .map_err(|e| SimvisError::resource(format!("failed to spawn export thread: {e}")))?;

        self.export_result = None;
        self.export = Some(ExportJob {
            first: req.first,
            last: req.last,
            current: req.first,
            cancel,
            events: rx,
        });
        Ok(())
    }

    /// Ask the running export to stop before its next frame. Returns `false` when idle.
    pub fn cancel_export(&self) -> bool {
        match &self.export {
            Some(job) => {
                job.cancel.store(true, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Block until the running export finishes. Returns `false` when no export was running.
    pub fn wait_for_export(&mut self) -> bool {
        if self.export.is_none() {
            return false;
        }
        while let Some(event) = self.next_export_event(true) {
            self.apply_export_event(event);
        }
        true
    }

    /// Result of the last finished export, once.
    pub fn take_export_result(&mut self) -> Option<SimvisResult<ExportStats>> {
        self.export_result.take()
    }

    fn next_export_event(&self, block: bool) -> Option<ExportEvent> {
        let job = self.export.as_ref()?;
        let received = if block {
            job.events.recv().map_err(|_| TryRecvError::Disconnected)
        } else {
            job.events.try_recv()
        };
        match received {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(ExportEvent::Finished(Err(
                SimvisError::resource("export thread ended without a result"),
            ))),
        }
    }

    fn apply_export_event(&mut self, event: ExportEvent) {
        match event {
            ExportEvent::Rendered(tick) => {
                if let Some(job) = self.export.as_mut() {
                    job.current = tick;
                }
            }
            ExportEvent::Finished(result) => {
                self.export = None;
                match &result {
                    Ok(stats) => tracing::info!(
                        frames = stats.frames_encoded,
                        cancelled = stats.cancelled,
                        "export done"
                    ),
                    Err(e) => tracing::error!(error = %e, "export failed"),
                }
                self.export_result = Some(result);
                self.view.redraw(self.tick);
            }
        }
    }
}

impl<V: FrameView> Drop for PlaybackController<V> {
    fn drop(&mut self) {
        self.cancel_export();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/controller.rs"]
mod tests;
