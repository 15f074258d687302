use base64::{engine::general_purpose::STANDARD, Engine as _};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::{
    error::FormError,
    style::{LineCap, LineJoin, StrokeStyle},
    surface::{Point, Surface, SurfaceSize, PNG_DATA_URL_PREFIX}
};

/// In-memory surface backed by a `tiny-skia` pixmap.
///
/// Starts fully transparent, like a fresh `<canvas>`.
pub struct RasterSurface {
    pixmap: Pixmap,
    paint:  Paint<'static>,
    stroke: Stroke
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, FormError> {
        let pixmap = Pixmap::new(width, height).ok_or(FormError::InvalidSize { width, height })?;
        let mut surface = Self {
            pixmap,
            paint: Paint::default(),
            stroke: Stroke::default()
        };
        surface.apply_style(&StrokeStyle::default());
        Ok(surface)
    }

    /// Alpha of one pixel, `None` when out of bounds.
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        self.pixmap.pixel(x, y).map(|p| p.alpha())
    }

    /// True when no pixel carries any ink.
    pub fn is_blank(&self) -> bool {
        self.pixmap.data().iter().all(|b| *b == 0)
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, FormError> {
        self.pixmap
            .encode_png()
            .map_err(|e| FormError::Encode(e.to_string()))
    }
}

fn sk_cap(cap: LineCap) -> tiny_skia::LineCap {
    match cap {
        LineCap::Butt => tiny_skia::LineCap::Butt,
        LineCap::Round => tiny_skia::LineCap::Round,
        LineCap::Square => tiny_skia::LineCap::Square
    }
}

fn sk_join(join: LineJoin) -> tiny_skia::LineJoin {
    match join {
        LineJoin::Miter => tiny_skia::LineJoin::Miter,
        LineJoin::Round => tiny_skia::LineJoin::Round,
        LineJoin::Bevel => tiny_skia::LineJoin::Bevel
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> SurfaceSize {
        SurfaceSize {
            width:  self.pixmap.width(),
            height: self.pixmap.height()
        }
    }

    fn apply_style(&mut self, style: &StrokeStyle) {
        let c = style.color;
        self.paint.set_color_rgba8(c.r, c.g, c.b, 255);
        self.paint.anti_alias = true;
        self.stroke = Stroke {
            width: style.width as f32,
            line_cap: sk_cap(style.cap),
            line_join: sk_join(style.join),
            ..Stroke::default()
        };
    }

    fn dot(&mut self, at: Point) {
        let radius = (self.stroke.width / 2.0).max(0.5);
        if let Some(path) = PathBuilder::from_circle(at.x as f32, at.y as f32, radius) {
            self.pixmap.fill_path(
                &path,
                &self.paint,
                FillRule::Winding,
                Transform::identity(),
                None
            );
        }
    }

    fn segment(&mut self, from: Point, to: Point) {
        if from == to {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        if let Some(path) = pb.finish() {
            self.pixmap
                .stroke_path(&path, &self.paint, &self.stroke, Transform::identity(), None);
        }
    }

    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn to_png_data_url(&self) -> Result<String, FormError> {
        let png = self.encode_png()?;
        Ok(format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn zero_sized_surface_is_rejected() {
        assert!(matches!(
            RasterSurface::new(0, 150),
            Err(FormError::InvalidSize { width: 0, height: 150 })
        ));
    }

    #[test]
    fn fresh_surface_is_transparent() {
        let s = RasterSurface::new(300, 150).unwrap();
        assert_eq!(s.size(), SurfaceSize { width: 300, height: 150 });
        assert!(s.is_blank());
    }

    #[test]
    fn segment_inks_its_midpoint_only() {
        let mut s = RasterSurface::new(100, 100).unwrap();
        s.segment(Point::new(10.0, 50.0), Point::new(90.0, 50.0));
        assert!(s.alpha_at(50, 50).unwrap() > 0);
        assert_eq!(s.alpha_at(50, 10), Some(0));
    }

    #[test]
    fn clear_erases_ink() {
        let mut s = RasterSurface::new(40, 40).unwrap();
        s.dot(Point::new(20.0, 20.0));
        assert!(!s.is_blank());
        s.clear();
        assert!(s.is_blank());
    }

    #[test]
    fn data_url_wraps_png_signature() {
        let s = RasterSurface::new(8, 8).unwrap();
        let url = s.to_png_data_url().unwrap();
        let payload = url.strip_prefix(PNG_DATA_URL_PREFIX).unwrap();
        let bytes = STANDARD.decode(payload).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
