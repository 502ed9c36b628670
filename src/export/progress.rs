use crate::foundation::core::Rgb;

/// Color of the progress bar while frames are being encoded.
pub const ENCODING_COLOR: Rgb = Rgb::new(0x00, 0x66, 0x00);
/// Label of every report after the first.
pub const ENCODING_LABEL: &str = "Encoding";

/// One progress update. `fraction` is in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    /// Completed share of the export.
    pub fraction: f64,
    /// Progress bar color.
    pub color: Rgb,
    /// Text shown next to the bar; empty for the reset report.
    pub label: String,
}

impl Progress {
    /// Reset report sent before the first frame.
    pub fn started() -> Self {
        Self {
            fraction: 0.0,
            color: ENCODING_COLOR,
            label: String::new(),
        }
    }

    /// Report while encoding; `fraction` is clamped into `[0, 1]`.
    pub fn encoding(fraction: f64) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
            color: ENCODING_COLOR,
            label: ENCODING_LABEL.to_string(),
        }
    }

    /// Whole percent completed, rounded down.
    pub fn percent(&self) -> u32 {
        (self.fraction * 100.0).floor() as u32
    }
}

/// Fire-and-forget progress receiver.
pub trait ProgressSink: Send {
    /// Receive one update. Must not block the export.
    fn report(&mut self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: FnMut(Progress) + Send,
{
    fn report(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Logs each update at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, progress: Progress) {
        tracing::info!(
            percent = progress.percent(),
            label = %progress.label,
            "export progress"
        );
    }
}

/// Emits [`Progress`] only when the whole percent moves forward.
#[derive(Debug)]
pub(crate) struct PercentGate {
    last_percent: u32,
}

impl PercentGate {
    pub(crate) fn new() -> Self {
        Self { last_percent: 0 }
    }

    pub(crate) fn offer(&mut self, fraction: f64) -> Option<Progress> {
        let p = Progress::encoding(fraction);
        let percent = p.percent();
        if percent > self.last_percent {
            self.last_percent = percent;
            Some(p)
        } else {
            None
        }
    }
}
