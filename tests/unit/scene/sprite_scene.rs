use super::*;
use crate::foundation::error::SimvisError;
use crate::sprite::icons::IconSet;
use crate::vector::model::VectorDescription;

const SQUARE: &str = r#"{
    "coordinates": {"width": 20, "height": 20},
    "colors": [{"id": "body", "rgb": "ff0000"}, {"id": "edge", "rgb": "000000"}],
    "drawOrder": [
        {"shape": "poly", "points": [0,0, 20,0, 20,20, 0,20], "stroke": "edge", "width": 1, "bkgrd": "body"}
    ]
}"#;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

fn scene(entities: Vec<EntityState>) -> SpriteScene {
    let mut icons = IconSet::new();
    icons.insert("box", VectorDescription::from_json_str(SQUARE).unwrap());
    let record = SimulationRecord::new(
        50,
        vec![TickFrame { entities }, TickFrame::default()],
    )
    .unwrap();
    let opts = SceneOpts {
        canvas: Canvas::new(200, 100).unwrap(),
        ..SceneOpts::default()
    };
    SpriteScene::new(icons, record, opts).unwrap()
}

fn at(x: f64, y: f64, heading: i32) -> EntityState {
    EntityState {
        icon: "box".to_string(),
        x,
        y,
        heading,
    }
}

#[test]
fn renders_entities_over_background() {
    let s = scene(vec![at(50.0, 50.0, 0), at(150.0, 50.0, 45)]);
    let f = s.render_tick(TickIndex(0), false).unwrap();
    assert_eq!((f.width, f.height), (200, 100));
    assert!(f.premultiplied);
    assert_eq!(f.pixel(50, 50), Some(RED));
    assert_eq!(f.pixel(150, 50), Some(RED));
    assert_eq!(f.pixel(100, 50), Some(WHITE));
    assert_eq!(f.pixel(5, 95), Some(WHITE));
}

#[test]
fn empty_tick_is_plain_background() {
    let s = scene(vec![at(50.0, 50.0, 0)]);
    let f = s.render_tick(TickIndex(1), false).unwrap();
    assert!(f.data.chunks_exact(4).all(|px| px == WHITE));
}

#[test]
fn same_heading_reuses_cached_sprite() {
    let s = scene(vec![at(50.0, 50.0, 90), at(150.0, 50.0, 450)]);
    s.render_tick(TickIndex(0), false).unwrap();
    s.render_tick(TickIndex(0), false).unwrap();
    let stats = s.icons().require("box").unwrap().stats();
    assert_eq!(stats.rebuilds, 1);
    assert_eq!(stats.hits, 3);
}

#[test]
fn zoom_moves_and_rebuilds() {
    let s = scene(vec![at(50.0, 25.0, 0)]);
    s.render_tick(TickIndex(0), false).unwrap();
    s.set_zoom(2.0).unwrap();
    let f = s.render_tick(TickIndex(0), false).unwrap();
    assert_eq!(f.pixel(100, 50), Some(RED));
    // Scaled square spans +/- 20 around the center.
    assert_eq!(f.pixel(85, 50), Some(RED));
    assert_eq!(f.pixel(50, 25), Some(WHITE));

    let cache = s.icons().require("box").unwrap();
    assert_eq!(cache.stats().rebuilds, 2);
    assert_eq!(cache.rendered_scale(0), Some(2.0));
}

#[test]
fn invalid_zoom_is_rejected() {
    let s = scene(vec![]);
    assert!(matches!(s.set_zoom(0.0), Err(SimvisError::Validation(_))));
    assert_eq!(s.zoom(), 1.0);
}

#[test]
fn frame_number_overlay_darkens_corner() {
    let s = scene(vec![]);
    let plain = s.render_tick(TickIndex(1), false).unwrap();
    let stamped = s.render_tick(TickIndex(1), true).unwrap();
    assert_eq!(plain.pixel(2, 2), Some(WHITE));
    let px = stamped.pixel(2, 2).unwrap();
    assert!(px[0] < 200, "{px:?}");
    assert_eq!(stamped.pixel(150, 80), Some(WHITE));
}

#[test]
fn unknown_icon_is_config_error() {
    let s = scene(vec![EntityState {
        icon: "truck".to_string(),
        x: 10.0,
        y: 10.0,
        heading: 0,
    }]);
    assert!(s.render_tick(TickIndex(0), false).unwrap_err().is_config());
}

#[test]
fn out_of_range_tick_is_validation_error() {
    let s = scene(vec![]);
    assert_eq!(s.max_tick(), TickIndex(1));
    assert!(matches!(
        s.render_tick(TickIndex(2), false),
        Err(SimvisError::Validation(_))
    ));
}

#[test]
fn scene_view_keeps_last_frame_and_error() {
    let s: std::sync::Arc<dyn Scene> = std::sync::Arc::new(scene(vec![]));
    let mut view = SceneView::new(s);
    view.redraw(TickIndex(0));
    assert!(view.last_frame().is_some());
    assert!(view.last_error().is_none());

    view.redraw(TickIndex(9));
    assert_eq!(view.last_tick(), Some(TickIndex(9)));
    assert!(view.last_error().is_some());
    assert!(view.last_frame().is_some());
    assert_eq!(view.redraws(), 2);
}
