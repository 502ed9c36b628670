use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{SimvisError, SimvisResult};

/// Configuration handed to a [`VideoEncoder`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// 0 is highest quality.
    pub quality: u8,
    /// Nominal spacing between timestamps, used as the output frame rate.
    pub frame_duration_ms: u64,
}

/// Sequential sink for rendered frames.
///
/// Ordering contract: `encode_frame` is called with strictly increasing timestamps, one call at a
/// time, after a successful `begin`. `close` is called exactly once per export, also when `begin`
/// or a frame failed, and must tolerate never having been started.
pub trait VideoEncoder: Send {
    /// Called once before any frame is submitted.
    fn begin(&mut self, cfg: EncoderConfig) -> SimvisResult<()>;
    /// Submit one frame; `timestamp_ms` strictly increases between calls.
    fn encode_frame(&mut self, frame: &FrameRGBA, timestamp_ms: u64) -> SimvisResult<()>;
    /// Finish the output. Called exactly once per export.
    fn close(&mut self) -> SimvisResult<()>;
}

impl<E: VideoEncoder + ?Sized> VideoEncoder for Box<E> {
    fn begin(&mut self, cfg: EncoderConfig) -> SimvisResult<()> {
        (**self).begin(cfg)
    }

    fn encode_frame(&mut self, frame: &FrameRGBA, timestamp_ms: u64) -> SimvisResult<()> {
        (**self).encode_frame(frame, timestamp_ms)
    }

    fn close(&mut self) -> SimvisResult<()> {
        (**self).close()
    }
}

/// In-memory encoder for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryEncoder {
    cfg: Option<EncoderConfig>,
    frames: Vec<(u64, FrameRGBA)>,
    close_calls: u32,
    fail_begin: bool,
    fail_at_frame: Option<usize>,
}

impl InMemoryEncoder {
    /// Create an empty in-memory encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `begin` fail, to exercise cleanup paths.
    pub fn failing_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    /// Make the `n`-th (0-based) `encode_frame` call fail.
    pub fn failing_at_frame(mut self, n: usize) -> Self {
        self.fail_at_frame = Some(n);
        self
    }

    /// Configuration captured by the last `begin`, if any.
    pub fn config(&self) -> Option<EncoderConfig> {
        self.cfg
    }

    /// Captured `(timestamp_ms, frame)` pairs in submission order.
    pub fn frames(&self) -> &[(u64, FrameRGBA)] {
        &self.frames
    }

    /// Timestamps of the captured frames.
    pub fn timestamps(&self) -> Vec<u64> {
        self.frames.iter().map(|(ts, _)| *ts).collect()
    }

    /// How many times `close` was called.
    pub fn close_calls(&self) -> u32 {
        self.close_calls
    }
}

impl VideoEncoder for InMemoryEncoder {
    fn begin(&mut self, cfg: EncoderConfig) -> SimvisResult<()> {
        if self.fail_begin {
            return Err(SimvisError::resource("in-memory encoder refused to start"));
        }
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn encode_frame(&mut self, frame: &FrameRGBA, timestamp_ms: u64) -> SimvisResult<()> {
        if self.cfg.is_none() {
            return Err(SimvisError::encode("encoder not started"));
        }
        if let Some((last, _)) = self.frames.last()
            && timestamp_ms <= *last
        {
            return Err(SimvisError::encode(format!(
                "timestamp {timestamp_ms} does not increase past {last}"
            )));
        }
        if self.fail_at_frame == Some(self.frames.len()) {
            return Err(SimvisError::encode("in-memory encoder write failed"));
        }
        self.frames.push((timestamp_ms, frame.clone()));
        Ok(())
    }

    fn close(&mut self) -> SimvisResult<()> {
        self.close_calls += 1;
        Ok(())
    }
}
