//! Declarative vector icons: palette, coordinate extent and ordered shape list.

/// Outline paths in centered local coordinates.
pub mod geometry;
mod json;
/// Shape and description types.
pub mod model;
/// Named color tables.
pub mod palette;

pub use model::{CoordinateSystem, Fill, Shape, ShapeItem, VectorDescription};
pub use palette::{IndexedColor, Palette};
