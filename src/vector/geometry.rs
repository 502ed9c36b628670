use crate::foundation::core::{BezPath, Point, Vec2};
use crate::vector::model::Shape;

/// Closed outline through `points` in order, each shifted by `-offset`.
pub fn polygon_path(points: &[Point], offset: Vec2) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter().map(|p| *p - offset);
    if let Some(first) = iter.next() {
        path.move_to(first);
        for p in iter {
            path.line_to(p);
        }
        path.close_path();
    }
    path
}

/// Open segment from `a` to `b`, both shifted by `-offset`.
pub fn line_path(a: Point, b: Point, offset: Vec2) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(a - offset);
    path.line_to(b - offset);
    path
}

impl Shape {
    /// `true` for a polygon without points; such a shape paints nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, Shape::Polygon { points, .. } if points.is_empty())
    }

    /// Stroke outline in centered local coordinates.
    pub fn outline(&self, offset: Vec2) -> BezPath {
        match self {
            Shape::Polygon { points, .. } => polygon_path(points, offset),
            Shape::Line { a, b } => line_path(*a, *b, offset),
        }
    }
}
