use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Rgb};
use crate::foundation::error::{SimvisError, SimvisResult};

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

pub(crate) fn rgb_paint(c: Rgb) -> vello_cpu::peniko::Color {
    rgba_paint(c.to_rgba8())
}

pub(crate) fn rgba_paint([r, g, b, a]: [u8; 4]) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

pub(crate) fn pixmap_paint(pixmap: Arc<vello_cpu::Pixmap>) -> vello_cpu::Image {
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(pixmap),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }
}

pub(crate) fn dims_to_u16(width: u32, height: u32) -> SimvisResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SimvisError::resource(format!("surface width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SimvisError::resource(format!("surface height {height} exceeds u16")))?;
    Ok((w, h))
}

/// Flush `ctx` into a fresh pixmap of the context's size.
pub(crate) fn finish_to_pixmap(mut ctx: vello_cpu::RenderContext) -> vello_cpu::Pixmap {
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(ctx.width(), ctx.height());
    ctx.render_to_pixmap(&mut pixmap);
    pixmap
}
