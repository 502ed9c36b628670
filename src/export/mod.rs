//! Export of a tick range to video.
//!
//! Encoders consume rendered frames in tick order; `run_export` is the only loop that feeds them.

/// Encoder contract and the in-memory encoder.
pub mod encoder;
/// `ffmpeg`-based encoder (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Progress reporting.
pub mod progress;
/// The export loop.
pub mod run;

pub use encoder::{EncoderConfig, InMemoryEncoder, VideoEncoder};
pub use ffmpeg::{FfmpegEncoder, FfmpegEncoderOpts, is_ffmpeg_on_path};
pub use progress::{LogProgress, Progress, ProgressSink};
pub use run::{ExportRequest, ExportStats, run_export};
