use super::*;
use crate::foundation::core::{Point, Rgb};
use crate::vector::model::{CoordinateSystem, Fill};
use crate::vector::palette::IndexedColor;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

fn palette() -> Palette {
    Palette::new(vec![
        IndexedColor::new("red", Rgb::new(255, 0, 0)),
        IndexedColor::new("black", Rgb::new(0, 0, 0)),
    ])
    .unwrap()
}

fn red_square() -> VectorDescription {
    VectorDescription::new(
        CoordinateSystem::new(40.0, 40.0).unwrap(),
        palette(),
        vec![ShapeItem {
            shape: Shape::Polygon {
                points: vec![
                    Point::new(0.0, 0.0),
                    Point::new(40.0, 0.0),
                    Point::new(40.0, 40.0),
                    Point::new(0.0, 40.0),
                ],
                fill: Fill::Solid("red".to_string()),
            },
            stroke: "black".to_string(),
            stroke_width: 2.0,
        }],
    )
    .unwrap()
}

/// Line from the icon center towards +x.
fn pointer() -> VectorDescription {
    VectorDescription::new(
        CoordinateSystem::new(40.0, 40.0).unwrap(),
        palette(),
        vec![ShapeItem {
            shape: Shape::Line {
                a: Point::new(20.0, 20.0),
                b: Point::new(40.0, 20.0),
            },
            stroke: "black".to_string(),
            stroke_width: 2.0,
        }],
    )
    .unwrap()
}

fn opaque_count(s: &Sprite) -> usize {
    s.data().chunks_exact(4).filter(|px| px[3] == 255).count()
}

#[test]
fn side_covers_diagonal_and_stroke() {
    // ceil(56.57) + ceil(2) + 2 = 61, rounded to even.
    assert_eq!(sprite_side(&red_square(), 1.0).unwrap(), 62);
    assert_eq!(sprite_side(&red_square(), 2.0).unwrap() % 2, 0);
    assert!(sprite_side(&red_square(), 2.0).unwrap() > 62);
}

#[test]
fn square_center_is_fill_and_border_is_stroke() {
    let s = rasterize(&red_square(), 1.0, 0).unwrap();
    let c = s.width() / 2;
    assert_eq!(s.width(), s.height());
    assert_eq!(s.pixel(c, c), Some(RED));
    assert_eq!(s.pixel(c - 5, c + 7), Some(RED));
    // Edges at c +/- 20, stroke covers +/- 1 around them.
    assert_eq!(s.pixel(c + 19, c), Some(BLACK));
    assert_eq!(s.pixel(c - 20, c), Some(BLACK));
    assert_eq!(s.pixel(c, c + 19), Some(BLACK));
    assert_eq!(s.pixel(c + 25, c).map(|px| px[3]), Some(0));
}

#[test]
fn square_rotated_90_keeps_footprint() {
    let a = rasterize(&red_square(), 1.0, 0).unwrap();
    let b = rasterize(&red_square(), 1.0, 90).unwrap();
    assert_eq!((a.width(), a.height()), (b.width(), b.height()));
    let c = b.width() / 2;
    assert_eq!(b.pixel(c, c), Some(RED));
    assert_eq!(b.pixel(c + 19, c), Some(BLACK));

    let (na, nb) = (opaque_count(&a) as f64, opaque_count(&b) as f64);
    assert!((na - nb).abs() / na < 0.02, "{na} vs {nb}");
}

#[test]
fn rotation_is_clockwise() {
    let east = rasterize(&pointer(), 1.0, 0).unwrap();
    let c = east.width() / 2;
    assert_eq!(east.pixel(c + 10, c), Some(BLACK));
    assert_eq!(east.pixel(c, c + 10).map(|px| px[3]), Some(0));

    let south = rasterize(&pointer(), 1.0, 90).unwrap();
    assert_eq!(south.pixel(c, c + 10), Some(BLACK));
    assert_eq!(south.pixel(c + 10, c).map(|px| px[3]), Some(0));

    let west = rasterize(&pointer(), 1.0, -180).unwrap();
    assert_eq!(west.angle(), 180);
    assert_eq!(west.pixel(c - 11, c), Some(BLACK));
}

#[test]
fn scale_grows_the_buffer() {
    let small = rasterize(&red_square(), 1.0, 0).unwrap();
    let big = rasterize(&red_square(), 2.0, 0).unwrap();
    assert!(big.width() > small.width());
    let c = big.width() / 2;
    // Square now spans +/- 40 around the center.
    assert_eq!(big.pixel(c + 30, c), Some(RED));
    assert_eq!(small.pixel(small.width() / 2 + 30, small.width() / 2).map(|px| px[3]), Some(0));
}

#[test]
fn invalid_scale_is_rejected() {
    for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            rasterize(&red_square(), scale, 0),
            Err(SimvisError::Validation(_))
        ));
    }
}

#[test]
fn oversize_buffer_is_resource_error() {
    assert!(matches!(
        rasterize(&red_square(), 1.0e6, 0),
        Err(SimvisError::Resource(_))
    ));
}

#[test]
fn later_items_paint_over_earlier_ones() {
    let mut items = red_square().draw_order().to_vec();
    items.push(ShapeItem {
        shape: Shape::Polygon {
            points: vec![
                Point::new(15.0, 15.0),
                Point::new(25.0, 15.0),
                Point::new(25.0, 25.0),
                Point::new(15.0, 25.0),
            ],
            fill: Fill::Gradient(vec!["black".to_string(), "red".to_string()]),
        },
        stroke: "black".to_string(),
        stroke_width: 0.0,
    });
    let d = VectorDescription::new(CoordinateSystem::new(40.0, 40.0).unwrap(), palette(), items)
        .unwrap();
    let s = rasterize(&d, 1.0, 0).unwrap();
    let c = s.width() / 2;
    assert_eq!(s.pixel(c, c), Some(BLACK));
    assert_eq!(s.pixel(c + 10, c), Some(RED));
}

fn with_stroke_width(mut d: Vec<ShapeItem>, width: f64) -> VectorDescription {
    for item in &mut d {
        item.stroke_width = width;
    }
    VectorDescription::new(CoordinateSystem::new(40.0, 40.0).unwrap(), palette(), d).unwrap()
}

#[test]
fn zero_width_polygon_border_is_hairline_stroke() {
    let s = rasterize(&with_stroke_width(red_square().draw_order().to_vec(), 0.0), 1.0, 0).unwrap();
    let c = s.width() / 2;
    assert_eq!(s.pixel(c, c), Some(RED));
    // Hairline straddles the edge at c + 20: half a pixel of black on each side.
    let outside = s.pixel(c + 20, c).unwrap();
    assert!(outside[3] > 0, "{outside:?}");
    assert_eq!(&outside[..3], &[0, 0, 0]);
    let inside = s.pixel(c + 19, c).unwrap();
    assert!(inside[0] < 255, "{inside:?}");
    assert_eq!(s.pixel(c + 22, c).map(|px| px[3]), Some(0));
}

#[test]
fn zero_width_line_is_drawn_one_device_pixel_wide() {
    for scale in [1.0, 3.0] {
        let s = rasterize(&with_stroke_width(pointer().draw_order().to_vec(), 0.0), scale, 0)
            .unwrap();
        let c = s.width() / 2;
        let x = c + (10.0 * scale) as u32;
        let covered: u32 = (c - 3..c + 3)
            .map(|y| u32::from(s.pixel(x, y).unwrap()[3]))
            .sum();
        // One pixel of full coverage, spread over the rows the line straddles.
        assert!((200..=310).contains(&covered), "scale {scale}: {covered}");
    }
}

#[test]
fn empty_polygon_paints_nothing() {
    let d = VectorDescription::new(
        CoordinateSystem::new(40.0, 40.0).unwrap(),
        palette(),
        vec![ShapeItem {
            shape: Shape::Polygon {
                points: Vec::new(),
                fill: Fill::Solid("red".to_string()),
            },
            stroke: "black".to_string(),
            stroke_width: 2.0,
        }],
    )
    .unwrap();
    let s = rasterize(&d, 1.0, 0).unwrap();
    assert_eq!(opaque_count(&s), 0);
    assert!(s.data().iter().all(|b| *b == 0));
}
