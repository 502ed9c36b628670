//! Interactive playback and background export over a shared scene.

/// Playback pulse source and options.
pub mod clock;
/// Tick, playback and export state machine.
pub mod controller;

pub use clock::{CLOCK_RATES_MS, PlaybackClock, PlaybackOpts};
pub use controller::{PlaybackController, PlaybackState, StepOutcome};
