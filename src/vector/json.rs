//! JSON form of a vector description.
//!
//! ```json
//! {
//!   "coordinates": { "width": 40, "height": 40 },
//!   "colors": [ { "id": "body", "rgb": "ff0000" } ],
//!   "drawOrder": [
//!     { "shape": "poly", "points": [0,0, 40,0, 40,40, 0,40],
//!       "stroke": "edge", "width": 2, "bkgrd": "body" },
//!     { "shape": "line", "points": [0,20, 40,20], "stroke": "edge", "width": 1 }
//!   ]
//! }
//! ```
//!
//! String shape tags only exist here; everything past [`VectorDescription::from_json_str`] works
//! on [`Shape`].

use std::io::Read;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{Point, Rgb};
use crate::foundation::error::{SimvisError, SimvisResult};
use crate::vector::model::{CoordinateSystem, Fill, Shape, ShapeItem, VectorDescription};
use crate::vector::palette::{IndexedColor, Palette};

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVectorDescription {
    coordinates: CoordinateSystem,
    #[serde(default)]
    colors: Vec<RawColor>,
    #[serde(default)]
    draw_order: Vec<RawItem>,
}

#[derive(Debug, serde::Deserialize)]
struct RawColor {
    id: String,
    #[serde(default, alias = "RGB")]
    rgb: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct RawItem {
    shape: String,
    #[serde(default)]
    points: Vec<f64>,
    stroke: String,
    /// Missing means 0, a hairline.
    #[serde(default)]
    width: f64,
    #[serde(default)]
    bkgrd: Option<String>,
    #[serde(default)]
    gradient: Option<Vec<String>>,
}

impl VectorDescription {
    /// Parse and validate a description from JSON text.
    pub fn from_json_str(s: &str) -> SimvisResult<Self> {
        let raw: RawVectorDescription = serde_json::from_str(s)?;
        raw.into_description()
    }

    /// Parse and validate a description from a JSON reader.
    pub fn from_reader(r: impl Read) -> SimvisResult<Self> {
        let raw: RawVectorDescription = serde_json::from_reader(r)?;
        raw.into_description()
    }

    /// Load a description from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> SimvisResult<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path)
            .with_context(|| format!("open vector description '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(f))
    }
}

impl RawVectorDescription {
    fn into_description(self) -> SimvisResult<VectorDescription> {
        let colors = self
            .colors
            .into_iter()
            .map(|c| {
                let rgb = c.rgb.as_deref().map(Rgb::from_hex).transpose()?;
                Ok(IndexedColor { id: c.id, rgb })
            })
            .collect::<SimvisResult<Vec<_>>>()?;
        let palette = Palette::new(colors)?;

        let items = self
            .draw_order
            .into_iter()
            .enumerate()
            .map(|(i, item)| item.into_shape_item(i))
            .collect::<SimvisResult<Vec<_>>>()?;

        VectorDescription::new(self.coordinates, palette, items)
    }
}

impl RawItem {
    fn into_shape_item(self, index: usize) -> SimvisResult<ShapeItem> {
        let shape = match self.shape.as_str() {
            "poly" => {
                if !self.points.len().is_multiple_of(2) {
                    return Err(SimvisError::config(format!(
                        "drawOrder[{index}]: polygon points array has odd length {}",
                        self.points.len()
                    )));
                }
                let fill = match (self.bkgrd, self.gradient) {
                    (Some(id), _) => Fill::Solid(id),
                    (None, Some(stops)) => Fill::Gradient(stops),
                    (None, None) => {
                        return Err(SimvisError::config(format!(
                            "drawOrder[{index}]: no background or gradient for polygon"
                        )));
                    }
                };
                let points = self
                    .points
                    .chunks_exact(2)
                    .map(|xy| Point::new(xy[0], xy[1]))
                    .collect();
                Shape::Polygon { points, fill }
            }
            "line" => {
                let &[ax, ay, bx, by] = self.points.as_slice() else {
                    return Err(SimvisError::config(format!(
                        "drawOrder[{index}]: line needs exactly 4 point scalars, got {}",
                        self.points.len()
                    )));
                };
                Shape::Line {
                    a: Point::new(ax, ay),
                    b: Point::new(bx, by),
                }
            }
            other => {
                return Err(SimvisError::config(format!(
                    "drawOrder[{index}]: unknown shape '{other}'"
                )));
            }
        };

        Ok(ShapeItem {
            shape,
            stroke: self.stroke,
            stroke_width: self.width,
        })
    }
}
