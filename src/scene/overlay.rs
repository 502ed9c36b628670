use kurbo::Shape as _;

use crate::foundation::core::{BezPath, Point, Rect};

// Segment bits: a=top, b=top right, c=bottom right, d=bottom, e=bottom left, f=top left, g=middle.
const DIGIT_SEGMENTS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

const WIDTH_RATIO: f64 = 0.55;
const THICKNESS_RATIO: f64 = 0.12;
const GAP_RATIO: f64 = 0.25;

fn digits(n: u64) -> Vec<u8> {
    n.to_string().bytes().map(|b| b - b'0').collect()
}

fn segment_rects(mask: u8, x: f64, y: f64, h: f64) -> impl Iterator<Item = Rect> {
    let w = h * WIDTH_RATIO;
    let t = h * THICKNESS_RATIO;
    let mid = h / 2.0;
    let rects = [
        Rect::new(0.0, 0.0, w, t),
        Rect::new(w - t, 0.0, w, mid),
        Rect::new(w - t, mid, w, h),
        Rect::new(0.0, h - t, w, h),
        Rect::new(0.0, mid, t, h),
        Rect::new(0.0, 0.0, t, mid),
        Rect::new(0.0, mid - t / 2.0, w, mid + t / 2.0),
    ];
    rects
        .into_iter()
        .enumerate()
        .filter(move |(bit, _)| mask & (1 << bit) != 0)
        .map(move |(_, r)| r + kurbo::Vec2::new(x, y))
}

/// Size of the path [`frame_number_path`] produces for `n`.
pub fn frame_number_size(n: u64, digit_height: f64) -> (f64, f64) {
    let count = digits(n).len() as f64;
    let w = digit_height * WIDTH_RATIO;
    let gap = digit_height * GAP_RATIO;
    (count * w + (count - 1.0).max(0.0) * gap, digit_height)
}

/// Seven-segment rendering of `n` with its top-left corner at `origin`.
pub fn frame_number_path(n: u64, origin: Point, digit_height: f64) -> BezPath {
    let advance = digit_height * (WIDTH_RATIO + GAP_RATIO);
    let mut path = BezPath::new();
    for (i, d) in digits(n).into_iter().enumerate() {
        let x = origin.x + i as f64 * advance;
        for r in segment_rects(DIGIT_SEGMENTS[usize::from(d)], x, origin.y, digit_height) {
            path.extend(r.path_elements(0.1));
        }
    }
    path
}
