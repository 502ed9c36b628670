use std::io::Read;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::TickIndex;
use crate::foundation::error::{SimvisError, SimvisResult};

/// One icon instance at one tick, in canvas units before zoom.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EntityState {
    /// Name of the icon in the [`IconSet`](crate::IconSet).
    pub icon: String,
    /// Horizontal center position.
    pub x: f64,
    /// Vertical center position.
    pub y: f64,
    /// Clockwise degrees; any integer, wrapped by the sprite cache.
    #[serde(default)]
    pub heading: i32,
}

/// Every entity visible at one tick, in draw order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TickFrame {
    /// Entities painted back to front.
    #[serde(default)]
    pub entities: Vec<EntityState>,
}

/// Recorded simulation: one entity snapshot per tick at a fixed frame duration.
///
/// ```json
/// { "frameDurationMs": 50,
///   "ticks": [ { "entities": [ { "icon": "car", "x": 10, "y": 20, "heading": 90 } ] } ] }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRecord {
    /// Simulated milliseconds per tick.
    pub frame_duration_ms: u64,
    /// Snapshots indexed by tick.
    pub ticks: Vec<TickFrame>,
}

impl SimulationRecord {
    /// Build and validate a record.
    pub fn new(frame_duration_ms: u64, ticks: Vec<TickFrame>) -> SimvisResult<Self> {
        let rec = Self {
            frame_duration_ms,
            ticks,
        };
        rec.validate()?;
        Ok(rec)
    }

    /// Parse and validate a record from JSON text.
    pub fn from_json_str(s: &str) -> SimvisResult<Self> {
        let rec: Self = serde_json::from_str(s)?;
        rec.validate()?;
        Ok(rec)
    }

    /// Parse and validate a record from a JSON reader.
    pub fn from_reader(r: impl Read) -> SimvisResult<Self> {
        let rec: Self = serde_json::from_reader(r)?;
        rec.validate()?;
        Ok(rec)
    }

    /// Load a record from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> SimvisResult<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path)
            .with_context(|| format!("open simulation record '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(f))
    }

    /// Reject zero frame duration, an empty tick list and non-finite positions.
    pub fn validate(&self) -> SimvisResult<()> {
        if self.frame_duration_ms == 0 {
            return Err(SimvisError::validation("frameDurationMs must be > 0"));
        }
        if self.ticks.is_empty() {
            return Err(SimvisError::validation("record has no ticks"));
        }
        for (t, frame) in self.ticks.iter().enumerate() {
            for (i, e) in frame.entities.iter().enumerate() {
                if !e.x.is_finite() || !e.y.is_finite() {
                    return Err(SimvisError::validation(format!(
                        "ticks[{t}].entities[{i}]: position must be finite"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Last valid tick. A validated record always has at least one.
    pub fn max_tick(&self) -> TickIndex {
        TickIndex(self.ticks.len().saturating_sub(1) as u64)
    }

    /// Snapshot at `tick`, or `None` past the end.
    pub fn frame(&self, tick: TickIndex) -> Option<&TickFrame> {
        usize::try_from(tick.0).ok().and_then(|i| self.ticks.get(i))
    }
}
