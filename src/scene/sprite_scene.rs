use std::sync::{Arc, PoisonError, RwLock};

use crate::foundation::core::{Affine, Canvas, FrameRGBA, Point, Rect, TickIndex};
use crate::foundation::error::{SimvisError, SimvisResult};
use crate::render::cpu::{
    affine_to_cpu, bezpath_to_cpu, dims_to_u16, finish_to_pixmap, pixmap_paint, rgba_paint,
};
use crate::scene::Scene;
use crate::scene::overlay::{frame_number_path, frame_number_size};
use crate::scene::record::SimulationRecord;
use crate::sprite::icons::IconSet;

/// Zoom presets offered by the CLI and interactive front ends.
pub const ZOOM_PRESETS: [f64; 10] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

const OVERLAY_DIGIT_HEIGHT: f64 = 16.0;
const OVERLAY_MARGIN: f64 = 6.0;
const OVERLAY_PLATE: [u8; 4] = [0, 0, 0, 160];
const OVERLAY_INK: [u8; 4] = [255, 255, 255, 255];

/// Construction options for [`SpriteScene`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneOpts {
    /// Output frame size.
    pub canvas: Canvas,
    /// Initial zoom; also the scale sprites are requested at.
    pub zoom: f64,
    /// Straight RGBA8.
    pub background: [u8; 4],
}

impl Default for SceneOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            zoom: 1.0,
            background: [255, 255, 255, 255],
        }
    }
}

fn validate_zoom(zoom: f64) -> SimvisResult<()> {
    if !zoom.is_finite() || zoom <= 0.0 {
        return Err(SimvisError::validation(format!(
            "zoom must be finite and > 0, got {zoom}"
        )));
    }
    Ok(())
}

/// Scene that draws every recorded entity through its icon's sprite cache.
pub struct SpriteScene {
    icons: IconSet,
    record: SimulationRecord,
    canvas: Canvas,
    background: [u8; 4],
    zoom: RwLock<f64>,
}

impl SpriteScene {
    /// Create a scene. Icons referenced by the record are resolved at render time.
    pub fn new(icons: IconSet, record: SimulationRecord, opts: SceneOpts) -> SimvisResult<Self> {
        record.validate()?;
        validate_zoom(opts.zoom)?;
        Canvas::new(opts.canvas.width, opts.canvas.height)?;
        Ok(Self {
            icons,
            record,
            canvas: opts.canvas,
            background: opts.background,
            zoom: RwLock::new(opts.zoom),
        })
    }

    /// Icon caches used for drawing.
    pub fn icons(&self) -> &IconSet {
        &self.icons
    }

    /// Recorded simulation being shown.
    pub fn record(&self) -> &SimulationRecord {
        &self.record
    }

    /// Current zoom.
    pub fn zoom(&self) -> f64 {
        *self.zoom.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the zoom. Cached sprites are rebuilt lazily the next time each slot is drawn.
    pub fn set_zoom(&self, zoom: f64) -> SimvisResult<()> {
        validate_zoom(zoom)?;
        *self.zoom.write().unwrap_or_else(PoisonError::into_inner) = zoom;
        Ok(())
    }

    fn draw_overlay(ctx: &mut vello_cpu::RenderContext, tick: TickIndex) {
        let (w, h) = frame_number_size(tick.0, OVERLAY_DIGIT_HEIGHT);
        let plate = Rect::new(0.0, 0.0, w + 2.0 * OVERLAY_MARGIN, h + 2.0 * OVERLAY_MARGIN);
        let digits = frame_number_path(
            tick.0,
            Point::new(OVERLAY_MARGIN, OVERLAY_MARGIN),
            OVERLAY_DIGIT_HEIGHT,
        );

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(rgba_paint(OVERLAY_PLATE));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            plate.x0, plate.y0, plate.x1, plate.y1,
        ));
        ctx.set_paint(rgba_paint(OVERLAY_INK));
        ctx.fill_path(&bezpath_to_cpu(&digits));
    }
}

impl Scene for SpriteScene {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn max_tick(&self) -> TickIndex {
        self.record.max_tick()
    }

    fn frame_duration_ms(&self) -> u64 {
        self.record.frame_duration_ms
    }

    fn render_tick(&self, tick: TickIndex, annotate_frame_number: bool) -> SimvisResult<FrameRGBA> {
        let frame = self.record.frame(tick).ok_or_else(|| {
            SimvisError::validation(format!(
                "tick {} out of range 0..={}",
                tick.0,
                self.max_tick().0
            ))
        })?;
        let zoom = self.zoom();
        let (w, h) = dims_to_u16(self.canvas.width, self.canvas.height)?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint(rgba_paint(self.background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));

        for entity in &frame.entities {
            let cache = self.icons.require(&entity.icon)?;
            let sprite = cache.get_image(zoom, entity.heading)?;
            let sw = f64::from(sprite.width());
            let sh = f64::from(sprite.height());
            // Sprite sides are even, so the snapped corner keeps the icon centered.
            let x = (entity.x * zoom).round() - sw / 2.0;
            let y = (entity.y * zoom).round() - sh / 2.0;

            ctx.set_transform(affine_to_cpu(Affine::translate((x, y))));
            ctx.set_paint(pixmap_paint(Arc::clone(sprite.pixmap())));
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, sw, sh));
        }

        if annotate_frame_number {
            Self::draw_overlay(&mut ctx, tick);
        }

        let pixmap = finish_to_pixmap(ctx);
        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

impl std::fmt::Debug for SpriteScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpriteScene")
            .field("icons", &self.icons.len())
            .field("ticks", &self.record.ticks.len())
            .field("canvas", &self.canvas)
            .field("zoom", &self.zoom())
            .finish()
    }
}
