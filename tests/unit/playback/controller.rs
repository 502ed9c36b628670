use super::*;
use crate::export::encoder::InMemoryEncoder;
use crate::export::progress::Progress;
use crate::foundation::core::{Canvas, FrameRGBA};
use crate::scene::view::RecordingView;
use std::time::{Duration, Instant};

struct Blank {
    max_tick: u64,
}

impl Scene for Blank {
    fn canvas(&self) -> Canvas {
        Canvas::new(2, 2).unwrap()
    }

    fn max_tick(&self) -> TickIndex {
        TickIndex(self.max_tick)
    }

    fn frame_duration_ms(&self) -> u64 {
        50
    }

    fn render_tick(&self, tick: TickIndex, _annotate: bool) -> SimvisResult<FrameRGBA> {
        if tick.0 > self.max_tick {
            return Err(SimvisError::validation("tick out of range"));
        }
        Ok(FrameRGBA {
            width: 2,
            height: 2,
            data: vec![tick.0 as u8; 16],
            premultiplied: true,
        })
    }
}

fn controller(max_tick: u64) -> PlaybackController<RecordingView> {
    PlaybackController::new(
        Arc::new(Blank { max_tick }),
        RecordingView::default(),
        PlaybackOpts::default(),
    )
    .unwrap()
}

fn pump_until(
    ctl: &mut PlaybackController<RecordingView>,
    done: impl Fn(&PlaybackController<RecordingView>) -> bool,
) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(ctl) {
        assert!(Instant::now() < deadline, "timed out at tick {}", ctl.tick().0);
        ctl.pump();
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn new_draws_tick_zero() {
    let ctl = controller(100);
    assert_eq!(ctl.tick(), TickIndex(0));
    assert_eq!(ctl.state(), PlaybackState::Idle);
    assert_eq!(ctl.view().ticks, vec![TickIndex(0)]);
}

#[test]
fn jump_clamps_and_redraws_once() {
    let mut ctl = controller(100);
    assert_eq!(ctl.jump(-5), TickIndex(0));
    assert_eq!(ctl.jump(500), TickIndex(100));
    assert_eq!(ctl.jump(42), TickIndex(42));
    assert_eq!(
        ctl.view().ticks,
        vec![TickIndex(0), TickIndex(0), TickIndex(100), TickIndex(42)]
    );
}

#[test]
fn step_past_either_end_reports_boundary() {
    let mut ctl = controller(100);
    assert_eq!(ctl.advance_by_step(-1), StepOutcome::BoundaryReached);
    assert_eq!(ctl.tick(), TickIndex(0));

    ctl.jump(100);
    assert_eq!(ctl.advance_by_step(1), StepOutcome::BoundaryReached);
    assert_eq!(ctl.tick(), TickIndex(100));

    assert_eq!(ctl.advance_by_step(-10), StepOutcome::Advanced);
    assert_eq!(ctl.tick(), TickIndex(90));

    // Overshoot lands on the boundary.
    assert_eq!(ctl.advance_by_step(25), StepOutcome::BoundaryReached);
    assert_eq!(ctl.tick(), TickIndex(100));
}

#[test]
fn boundary_stops_playback() {
    let mut ctl = controller(100);
    ctl.jump(100);
    ctl.start().unwrap();
    assert!(matches!(ctl.state(), PlaybackState::Playing { .. }));
    assert_eq!(ctl.advance_by_step(1), StepOutcome::BoundaryReached);
    assert_eq!(ctl.state(), PlaybackState::Idle);
}

#[test]
fn clock_drives_ticks_until_the_end() {
    let mut ctl = controller(3);
    ctl.set_clock_rate(5).unwrap();
    ctl.start().unwrap();
    assert_eq!(ctl.state(), PlaybackState::Playing { interval_ms: 5 });
    pump_until(&mut ctl, |c| c.state() == PlaybackState::Idle);
    assert_eq!(ctl.tick(), TickIndex(3));
    let drawn = &ctl.view().ticks;
    assert!(drawn.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn zero_clock_rate_is_rejected() {
    let mut ctl = controller(3);
    assert!(matches!(
        ctl.set_clock_rate(0),
        Err(SimvisError::Validation(_))
    ));
    assert_eq!(ctl.interval_ms(), 50);
    ctl.set_clock_rate(200).unwrap();
    assert_eq!(ctl.interval_ms(), 200);
    // rate change alone does not start playback
    assert_eq!(ctl.state(), PlaybackState::Idle);
}

#[test]
fn export_stops_playback_and_restores_tick() {
    let mut ctl = controller(9);
    ctl.jump(4);
    ctl.start().unwrap();

    let req = ExportRequest::full(ctl.max_tick());
    ctl.begin_export(req, Box::new(InMemoryEncoder::new()), Box::new(|_p: Progress| {}))
        .unwrap();
    assert!(matches!(
        ctl.state(),
        PlaybackState::Exporting {
            first: TickIndex(0),
            last: TickIndex(9),
            ..
        }
    ));
    assert!(matches!(ctl.start(), Err(SimvisError::Validation(_))));

    assert!(ctl.wait_for_export());
    assert_eq!(ctl.state(), PlaybackState::Idle);
    assert_eq!(ctl.tick(), TickIndex(4));
    assert_eq!(ctl.view().ticks.last(), Some(&TickIndex(4)));
    let stats = ctl.take_export_result().unwrap().unwrap();
    assert_eq!(stats.frames_encoded, 10);
    assert!(!stats.cancelled);
    assert!(ctl.take_export_result().is_none());
}

#[test]
fn invalid_export_range_is_rejected_up_front() {
    let mut ctl = controller(9);
    let req = ExportRequest {
        first: TickIndex(3),
        last: TickIndex(10),
        quality: 0,
        annotate_frame_number: false,
    };
    assert!(matches!(
        ctl.begin_export(req, Box::new(InMemoryEncoder::new()), Box::new(|_p: Progress| {})),
        Err(SimvisError::Validation(_))
    ));
    assert_eq!(ctl.state(), PlaybackState::Idle);
    assert!(!ctl.wait_for_export());
}

#[test]
fn failed_export_keeps_session_usable() {
    let mut ctl = controller(9);
    ctl.begin_export(
        ExportRequest::full(ctl.max_tick()),
        Box::new(InMemoryEncoder::new().failing_begin()),
        Box::new(|_p: Progress| {}),
    )
    .unwrap();
    ctl.wait_for_export();
    assert!(matches!(
        ctl.take_export_result(),
        Some(Err(SimvisError::Resource(_)))
    ));
    assert_eq!(ctl.jump(3), TickIndex(3));
    ctl.start().unwrap();
}

struct Slow(Blank);

impl Scene for Slow {
    fn canvas(&self) -> Canvas {
        self.0.canvas()
    }

    fn max_tick(&self) -> TickIndex {
        self.0.max_tick()
    }

    fn frame_duration_ms(&self) -> u64 {
        self.0.frame_duration_ms()
    }

    fn render_tick(&self, tick: TickIndex, annotate: bool) -> SimvisResult<FrameRGBA> {
        std::thread::sleep(Duration::from_millis(10));
        self.0.render_tick(tick, annotate)
    }
}

#[test]
fn cancel_export_stops_early_and_restores_tick() {
    let mut ctl = PlaybackController::new(
        Arc::new(Slow(Blank { max_tick: 999 })),
        RecordingView::default(),
        PlaybackOpts::default(),
    )
    .unwrap();
    assert!(!ctl.cancel_export());
    ctl.jump(7);

    ctl.begin_export(
        ExportRequest::full(ctl.max_tick()),
        Box::new(InMemoryEncoder::new()),
        Box::new(|_p: Progress| {}),
    )
    .unwrap();
    pump_until(&mut ctl, |c| {
        matches!(c.state(), PlaybackState::Exporting { current, .. } if current.0 >= 2)
    });

    assert!(ctl.cancel_export());
    assert!(ctl.wait_for_export());
    assert_eq!(ctl.state(), PlaybackState::Idle);
    assert_eq!(ctl.tick(), TickIndex(7));
    assert_eq!(ctl.view().ticks.last(), Some(&TickIndex(7)));

    let stats = ctl.take_export_result().unwrap().unwrap();
    assert!(stats.cancelled);
    assert!(stats.frames_encoded >= 2 && stats.frames_encoded < 1000);
}
