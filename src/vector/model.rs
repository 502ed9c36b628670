use std::collections::HashMap;

use crate::foundation::core::{Point, Rgb, Vec2};
use crate::foundation::error::{SimvisError, SimvisResult};
use crate::vector::palette::Palette;

/// Extent of the local coordinate space an icon is authored in.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CoordinateSystem {
    /// Declared width in local units.
    pub width: f64,
    /// Declared height in local units.
    pub height: f64,
}

impl CoordinateSystem {
    /// Create an extent; both sides must be finite and non-negative.
    pub fn new(width: f64, height: f64) -> SimvisResult<Self> {
        let cs = Self { width, height };
        cs.validate()?;
        Ok(cs)
    }

    fn validate(self) -> SimvisResult<()> {
        if !self.width.is_finite() || !self.height.is_finite() {
            return Err(SimvisError::config("coordinate system extent must be finite"));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(SimvisError::config(
                "coordinate system extent must be non-negative",
            ));
        }
        Ok(())
    }

    /// Offset subtracted from every local point so the declared top-left origin lands on the
    /// icon's geometric center.
    pub fn center_offset(self) -> Vec2 {
        Vec2::new((self.width / 2.0).ceil(), (self.height / 2.0).ceil())
    }

    /// Length of the extent diagonal, the largest span any rotation covers.
    pub fn diagonal(self) -> f64 {
        self.width.hypot(self.height)
    }
}

/// Polygon fill source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fill {
    /// Single palette color id.
    Solid(String),
    /// Multi-stop gradient. Painted as a solid fill of the first stop.
    Gradient(Vec<String>),
}

impl Fill {
    /// Color id actually painted for this fill.
    pub fn paint_color_id(&self) -> Option<&str> {
        match self {
            Fill::Solid(id) => Some(id),
            Fill::Gradient(stops) => stops.first().map(String::as_str),
        }
    }
}

/// Geometry of one shape item.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Closed outline through `points` in order, filled.
    Polygon {
        /// Vertices in local coordinates. May be empty, in which case nothing is painted.
        points: Vec<Point>,
        /// Interior paint.
        fill: Fill,
    },
    /// Single stroked segment; lines carry no fill.
    Line {
        /// Start point in local coordinates.
        a: Point,
        /// End point in local coordinates.
        b: Point,
    },
}

/// One entry of a draw order: geometry plus its stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeItem {
    /// Outline (and fill, for polygons).
    pub shape: Shape,
    /// Palette id of the stroke color.
    pub stroke: String,
    /// Stroke width in local units; `0` is a one-device-pixel hairline.
    pub stroke_width: f64,
}

/// Immutable declarative model of one icon: palette, extent and back-to-front shape list.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorDescription {
    coordinates: CoordinateSystem,
    palette: Palette,
    draw_order: Vec<ShapeItem>,
}

impl VectorDescription {
    /// Build a description, rejecting anything the rasterizer could not paint.
    pub fn new(
        coordinates: CoordinateSystem,
        palette: Palette,
        draw_order: Vec<ShapeItem>,
    ) -> SimvisResult<Self> {
        coordinates.validate()?;
        for (i, item) in draw_order.iter().enumerate() {
            validate_item(&palette, i, item)?;
        }
        Ok(Self {
            coordinates,
            palette,
            draw_order,
        })
    }

    /// Declared local extent.
    pub fn coordinates(&self) -> CoordinateSystem {
        self.coordinates
    }

    /// Named colors referenced by the draw order.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Shapes in paint order (back to front).
    pub fn draw_order(&self) -> &[ShapeItem] {
        &self.draw_order
    }

    /// Widest stroke in the draw order, `0` when empty.
    pub fn max_stroke_width(&self) -> f64 {
        self.draw_order
            .iter()
            .map(|i| i.stroke_width)
            .fold(0.0, f64::max)
    }

    /// Copy of this description with palette entries replaced by id.
    pub fn with_color_overrides(&self, overrides: &HashMap<String, Rgb>) -> SimvisResult<Self> {
        Self::new(
            self.coordinates,
            self.palette.with_overrides(overrides),
            self.draw_order.clone(),
        )
    }
}

fn validate_item(palette: &Palette, index: usize, item: &ShapeItem) -> SimvisResult<()> {
    let ctx = |e: SimvisError| match e {
        SimvisError::Config(msg) => SimvisError::config(format!("drawOrder[{index}]: {msg}")),
        other => other,
    };

    if !item.stroke_width.is_finite() || item.stroke_width < 0.0 {
        return Err(SimvisError::config(format!(
            "drawOrder[{index}]: stroke width must be finite and non-negative"
        )));
    }
    palette.resolve(&item.stroke).map_err(ctx)?;

    match &item.shape {
        Shape::Polygon { points, fill } => {
            if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
                return Err(SimvisError::config(format!(
                    "drawOrder[{index}]: polygon points must be finite"
                )));
            }
            let id = fill.paint_color_id().ok_or_else(|| {
                SimvisError::config(format!("drawOrder[{index}]: gradient has no stops"))
            })?;
            palette.resolve(id).map_err(ctx)?;
        }
        Shape::Line { a, b } => {
            if ![a.x, a.y, b.x, b.y].iter().all(|v| v.is_finite()) {
                return Err(SimvisError::config(format!(
                    "drawOrder[{index}]: line points must be finite"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/vector/model.rs"]
mod tests;
