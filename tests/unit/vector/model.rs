use super::*;
use crate::vector::palette::IndexedColor;

fn palette() -> Palette {
    Palette::new(vec![
        IndexedColor::new("fill", Rgb::new(255, 0, 0)),
        IndexedColor::new("edge", Rgb::new(0, 0, 0)),
    ])
    .unwrap()
}

fn square(fill: Fill) -> ShapeItem {
    ShapeItem {
        shape: Shape::Polygon {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(40.0, 0.0),
                Point::new(40.0, 40.0),
                Point::new(0.0, 40.0),
            ],
            fill,
        },
        stroke: "edge".to_string(),
        stroke_width: 2.0,
    }
}

#[test]
fn center_offset_rounds_up_half_extent() {
    let cs = CoordinateSystem::new(41.0, 40.0).unwrap();
    assert_eq!(cs.center_offset(), Vec2::new(21.0, 20.0));
}

#[test]
fn valid_description_preserves_draw_order() {
    let line = ShapeItem {
        shape: Shape::Line {
            a: Point::new(0.0, 0.0),
            b: Point::new(10.0, 0.0),
        },
        stroke: "edge".to_string(),
        stroke_width: 4.0,
    };
    let d = VectorDescription::new(
        CoordinateSystem::new(40.0, 40.0).unwrap(),
        palette(),
        vec![square(Fill::Solid("fill".to_string())), line.clone()],
    )
    .unwrap();
    assert_eq!(d.draw_order()[1], line);
    assert_eq!(d.max_stroke_width(), 4.0);
}

#[test]
fn unknown_stroke_color_is_config_error() {
    let mut item = square(Fill::Solid("fill".to_string()));
    item.stroke = "nope".to_string();
    let err = VectorDescription::new(CoordinateSystem::new(1.0, 1.0).unwrap(), palette(), vec![item])
        .unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("drawOrder[0]"));
}

#[test]
fn empty_gradient_is_config_error() {
    let err = VectorDescription::new(
        CoordinateSystem::new(1.0, 1.0).unwrap(),
        palette(),
        vec![square(Fill::Gradient(Vec::new()))],
    )
    .unwrap_err();
    assert!(err.is_config());
}

#[test]
fn negative_stroke_width_is_config_error() {
    let mut item = square(Fill::Solid("fill".to_string()));
    item.stroke_width = -1.0;
    assert!(
        VectorDescription::new(CoordinateSystem::new(1.0, 1.0).unwrap(), palette(), vec![item])
            .unwrap_err()
            .is_config()
    );
}

#[test]
fn color_overrides_produce_new_description() {
    let d = VectorDescription::new(
        CoordinateSystem::new(40.0, 40.0).unwrap(),
        palette(),
        vec![square(Fill::Solid("fill".to_string()))],
    )
    .unwrap();
    let mut o = HashMap::new();
    o.insert("fill".to_string(), Rgb::new(0, 255, 0));
    let d2 = d.with_color_overrides(&o).unwrap();
    assert_eq!(d.palette().resolve("fill").unwrap(), Rgb::new(255, 0, 0));
    assert_eq!(d2.palette().resolve("fill").unwrap(), Rgb::new(0, 255, 0));
    assert_eq!(d.draw_order(), d2.draw_order());
}
