use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::time::Duration;

use crate::foundation::error::{SimvisError, SimvisResult};

/// Interval presets offered to the user, in milliseconds.
pub const CLOCK_RATES_MS: [u64; 6] = [10, 50, 100, 200, 500, 1000];

/// Interval used when nothing else is configured.
pub const DEFAULT_CLOCK_MS: u64 = 50;

/// Environment override for the default playback interval.
pub const CLOCK_ENV_VAR: &str = "SIMVIS_CLOCK_MS";

/// Playback configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackOpts {
    /// Milliseconds between clock pulses; must be non-zero.
    pub interval_ms: u64,
}

impl Default for PlaybackOpts {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_CLOCK_MS,
        }
    }
}

impl PlaybackOpts {
    /// Defaults, with `SIMVIS_CLOCK_MS` applied when it holds a positive integer.
    pub fn from_env() -> Self {
        let interval_ms = std::env::var(CLOCK_ENV_VAR)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_CLOCK_MS);
        Self { interval_ms }
    }
}

/// Background pulse source for interactive playback.
///
/// At most one pulse is ever queued: a slow consumer sees coalesced pulses instead of a backlog.
/// Dropping the clock stops it without waiting for the thread.
#[derive(Debug)]
pub struct PlaybackClock {
    interval_ms: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
    pulses: Receiver<()>,
}

impl PlaybackClock {
    /// Spawn the pulse thread. A zero interval is a validation error.
    pub fn start(interval_ms: u64) -> SimvisResult<Self> {
        if interval_ms == 0 {
            return Err(SimvisError::validation("clock interval must be > 0 ms"));
        }
        let interval = Arc::new(AtomicU64::new(interval_ms));
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::sync_channel::<()>(1);

        let thread_interval = Arc::clone(&interval);
        let thread_stop = Arc::clone(&stop);
        std::thread::Builder::new()
            .name("simvis-clock".to_string())
            .spawn(move || run_clock(&thread_interval, &thread_stop, &tx))
            .map_err(|e| SimvisError::resource(format!("failed to spawn clock thread: {e}")))?;

        Ok(Self {
            interval_ms: interval,
            stop,
            pulses: rx,
        })
    }

    /// Current pulse interval.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms.load(Ordering::Relaxed)
    }

    /// Applies from the next pulse on.
    pub fn set_interval_ms(&self, interval_ms: u64) {
        self.interval_ms.store(interval_ms.max(1), Ordering::Relaxed);
    }

    /// Consume a pending pulse without blocking.
    pub fn try_pulse(&self) -> bool {
        self.pulses.try_recv().is_ok()
    }
}

impl Drop for PlaybackClock {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn run_clock(interval_ms: &AtomicU64, stop: &AtomicBool, tx: &SyncSender<()>) {
    loop {
        let ms = interval_ms.load(Ordering::Relaxed);
        std::thread::sleep(Duration::from_millis(ms));
        if stop.load(Ordering::Relaxed) {
            break;
        }
        match tx.try_send(()) {
            Ok(()) => tracing::debug!(interval_ms = ms, "clock pulse"),
            Err(TrySendError::Full(())) => {}
            Err(TrySendError::Disconnected(())) => break,
        }
    }
}
