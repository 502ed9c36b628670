use std::sync::Arc;

use crate::foundation::core::{Affine, FrameRGBA, Vec2};
use crate::foundation::error::{SimvisError, SimvisResult};
use crate::render::cpu::{affine_to_cpu, bezpath_to_cpu, finish_to_pixmap, rgb_paint};
use crate::vector::model::{Shape, ShapeItem, VectorDescription};
use crate::vector::palette::Palette;

/// One rasterized rotation of a vector description.
///
/// Square premultiplied RGBA8 buffer; the icon's geometric center sits at the buffer center.
#[derive(Clone)]
pub struct Sprite {
    pixmap: Arc<vello_cpu::Pixmap>,
    scale: f64,
    angle: u16,
}

impl Sprite {
    /// Buffer width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    /// Buffer height in pixels (equal to the width).
    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Premultiplied RGBA8 value at `(x, y)`, or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = ((y as usize) * (self.width() as usize) + (x as usize)) * 4;
        let px = self.data().get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Scale the bitmap was rendered at.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Rotation in whole degrees, `[0, 360)`.
    pub fn angle(&self) -> u16 {
        self.angle
    }

    /// Copy the bitmap into a premultiplied [`FrameRGBA`].
    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width(),
            height: self.height(),
            data: self.data().to_vec(),
            premultiplied: true,
        }
    }

    pub(crate) fn pixmap(&self) -> &Arc<vello_cpu::Pixmap> {
        &self.pixmap
    }
}

impl std::fmt::Debug for Sprite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sprite")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("scale", &self.scale)
            .field("angle", &self.angle)
            .finish()
    }
}

/// Side length of the square buffer a description needs at `scale`, for any rotation.
///
/// Diagonal of the declared extent plus stroke padding, rounded up to an even number so the
/// center falls on a pixel corner.
pub fn sprite_side(desc: &VectorDescription, scale: f64) -> SimvisResult<u16> {
    let extent = (desc.coordinates().diagonal() * scale).ceil();
    let pad = (desc.max_stroke_width() * scale).ceil() + 2.0;
    let side = extent + pad;
    if !side.is_finite() || side > f64::from(u16::MAX - 1) {
        return Err(SimvisError::resource(format!(
            "sprite buffer of {side} px at scale {scale} exceeds u16"
        )));
    }
    let side = (side as u16).max(2);
    Ok(side + side % 2)
}

/// Paint `desc` rotated by `angle_deg` (clockwise) and scaled by `scale` into a fresh buffer.
///
/// The buffer is only handed out once every item painted; a configuration error leaves nothing
/// behind.
#[tracing::instrument(level = "debug", skip(desc))]
pub fn rasterize(desc: &VectorDescription, scale: f64, angle_deg: i32) -> SimvisResult<Sprite> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(SimvisError::validation(format!(
            "sprite scale must be finite and > 0, got {scale}"
        )));
    }
    let angle = angle_deg.rem_euclid(360) as u16;
    let side = sprite_side(desc, scale)?;
    let center = f64::from(side) / 2.0;

    // Translation outermost: scale and rotation pivot around the buffer center.
    let transform = Affine::translate((center, center))
        * Affine::scale(scale)
        * Affine::rotate(f64::from(angle).to_radians());
    let offset = desc.coordinates().center_offset();

    let mut ctx = vello_cpu::RenderContext::new(side, side);
    ctx.set_transform(affine_to_cpu(transform));
    for item in desc.draw_order() {
        paint_item(&mut ctx, desc.palette(), item, offset, scale)?;
    }

    Ok(Sprite {
        pixmap: Arc::new(finish_to_pixmap(ctx)),
        scale,
        angle,
    })
}

fn paint_item(
    ctx: &mut vello_cpu::RenderContext,
    palette: &Palette,
    item: &ShapeItem,
    offset: Vec2,
    scale: f64,
) -> SimvisResult<()> {
    let stroke = palette.resolve(&item.stroke)?;
    let fill = match &item.shape {
        Shape::Polygon { fill, .. } => Some(
            fill.paint_color_id()
                .ok_or_else(|| SimvisError::config("gradient has no stops"))
                .and_then(|id| palette.resolve(id))?,
        ),
        Shape::Line { .. } => None,
    };
    if item.shape.is_empty() {
        return Ok(());
    }

    let outline = bezpath_to_cpu(&item.shape.outline(offset));
    if let Some(fill) = fill {
        ctx.set_paint(rgb_paint(fill));
        ctx.fill_path(&outline);
    }
    ctx.set_paint(rgb_paint(stroke));
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(stroke_width_local(
        item.stroke_width,
        scale,
    )));
    ctx.stroke_path(&outline);
    Ok(())
}

/// Stroke width in local units. Zero means a hairline one device pixel wide.
fn stroke_width_local(width: f64, scale: f64) -> f64 {
    if width > 0.0 { width } else { 1.0 / scale }
}

#[cfg(test)]
#[path = "../../tests/unit/sprite/raster.rs"]
mod tests;
