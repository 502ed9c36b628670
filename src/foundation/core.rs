use crate::foundation::error::{SimvisError, SimvisResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// 0-based index of one recorded simulation step.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TickIndex(pub u64);

impl TickIndex {
    /// Clamp a signed tick request into `[0, max]`.
    pub fn clamped(target: i64, max: TickIndex) -> TickIndex {
        if target <= 0 {
            return TickIndex(0);
        }
        TickIndex((target as u64).min(max.0))
    }

    /// Offset by a signed delta, returning `None` when the result leaves `[0, max]`.
    pub fn checked_step(self, delta: i64, max: TickIndex) -> Option<TickIndex> {
        let next = if delta >= 0 {
            self.0.checked_add(delta as u64)?
        } else {
            self.0.checked_sub(delta.unsigned_abs())?
        };
        (next <= max.0).then_some(TickIndex(next))
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas; both sides must be in `1..=u16::MAX`.
    pub fn new(width: u32, height: u32) -> SimvisResult<Self> {
        if width == 0 || height == 0 {
            return Err(SimvisError::validation("canvas width/height must be non-zero"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(SimvisError::validation("canvas width/height exceeds u16"));
        }
        Ok(Self { width, height })
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Opaque 24-bit color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse exactly six hex digits (`"ff8800"`) as a 24-bit integer.
    pub fn from_hex(s: &str) -> SimvisResult<Self> {
        let s = s.trim();
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SimvisError::config(format!(
                "color '{s}' must be exactly 6 hex digits"
            )));
        }
        let v = u32::from_str_radix(s, 16)
            .map_err(|e| SimvisError::config(format!("color '{s}': {e}")))?;
        Ok(Self {
            r: ((v >> 16) & 0xff) as u8,
            g: ((v >> 8) & 0xff) as u8,
            b: (v & 0xff) as u8,
        })
    }

    /// Opaque RGBA8 form (alpha 255).
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// A rendered frame as RGBA8 pixels, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, `width * height * 4` long.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA8 value at `(x, y)` as stored, or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the pixel data, e.g. for PNG output.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            crate::foundation::math::unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
