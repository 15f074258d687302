use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;

use crate::{
    error::FormError,
    style::StrokeStyle,
    surface::{Point, Surface, PNG_DATA_URL_PREFIX}
};

/// Normalized interaction event, whatever device produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressEvent {
    Start(Point),
    Move(Point),
    End
}

/// Pen bookkeeping between press and release.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StrokeState {
    /// Between a press and its release.
    pub active:      bool,
    /// Set by the first press, reset only by `clear`.
    pub has_content: bool,
    pub last:        Option<Point>
}

/// Encapsulates drawing logic and export of signature.
pub struct SignaturePad<S: Surface> {
    surface: S,
    style:   StrokeStyle,
    state:   StrokeState
}

impl<S: Surface> SignaturePad<S> {
    /// Bind to a surface and apply the pen style. The pad starts empty.
    pub fn new(mut surface: S, style: StrokeStyle) -> Self {
        surface.apply_style(&style);
        let size = surface.size();
        debug!("signature pad bound to {}x{} surface", size.width, size.height);
        Self {
            surface,
            style,
            state: StrokeState::default()
        }
    }

    /// Handle press: start a stroke anchored at `at`.
    pub fn press_start(&mut self, at: Point) {
        self.state = StrokeState {
            active:      true,
            has_content: true,
            last:        Some(at)
        };
        self.surface.dot(at);
    }

    /// Handle move: ink a segment from the previous point if active.
    pub fn press_move(&mut self, to: Point) {
        if !self.state.active {
            return;
        }
        if let Some(from) = self.state.last {
            self.surface.segment(from, to);
        }
        self.state.last = Some(to);
    }

    /// Handle release/leave: stop drawing.
    pub fn press_end(&mut self) {
        self.state.active = false;
        self.state.last = None;
    }

    /// Single entry point shared by mouse and touch input.
    pub fn handle(&mut self, event: PressEvent) {
        match event {
            PressEvent::Start(p) => self.press_start(p),
            PressEvent::Move(p) => self.press_move(p),
            PressEvent::End => self.press_end()
        }
    }

    /// Clear the surface.
    pub fn clear(&mut self) {
        self.surface.clear();
        self.state = StrokeState::default();
        debug!("signature cleared");
    }

    /// Is pad empty (nothing drawn)?
    pub fn is_empty(&self) -> bool {
        !self.state.has_content
    }

    pub fn is_drawing(&self) -> bool {
        self.state.active
    }

    pub fn state(&self) -> &StrokeState {
        &self.state
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: StrokeStyle) {
        self.surface.apply_style(&style);
        self.style = style;
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Export as PNG data URL (for `<img src="...">` or form upload).
    ///
    /// An empty pad still exports a valid blank image; check
    /// [`is_empty`](Self::is_empty) before treating it as a signature.
    pub fn export_image(&self) -> Result<String, FormError> {
        self.surface.to_png_data_url()
    }

    /// Export raw PNG bytes (without data URL).
    pub fn export_png_bytes(&self) -> Result<Vec<u8>, FormError> {
        let data_url = self.export_image()?;
        let b64 = data_url
            .strip_prefix(PNG_DATA_URL_PREFIX)
            .ok_or_else(|| FormError::Encode("unexpected data URL".into()))?;
        STANDARD
            .decode(b64)
            .map_err(|e| FormError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{raster::RasterSurface, style::Color};

    fn pad(w: u32, h: u32) -> SignaturePad<RasterSurface> {
        SignaturePad::new(RasterSurface::new(w, h).unwrap(), StrokeStyle::default())
    }

    #[test]
    fn new_pad_is_empty_and_idle() {
        let p = pad(300, 150);
        assert!(p.is_empty());
        assert_eq!(*p.state(), StrokeState::default());
    }

    #[test]
    fn press_marks_content_before_any_move() {
        let mut p = pad(100, 100);
        p.press_start(Point::new(20.0, 20.0));
        assert!(!p.is_empty());
        assert!(p.is_drawing());
        assert!(p.surface().alpha_at(20, 20).unwrap() > 0);
    }

    #[test]
    fn move_without_press_draws_nothing() {
        let mut p = pad(100, 100);
        p.press_move(Point::new(10.0, 10.0));
        p.press_move(Point::new(90.0, 90.0));
        assert!(p.surface().is_blank());
        assert!(p.is_empty());
    }

    #[test]
    fn move_after_release_draws_nothing() {
        let mut p = pad(100, 100);
        p.handle(PressEvent::Start(Point::new(10.0, 10.0)));
        p.handle(PressEvent::End);
        p.handle(PressEvent::Move(Point::new(90.0, 90.0)));
        assert_eq!(p.surface().alpha_at(50, 50), Some(0));
        assert_eq!(p.state().last, None);
    }

    #[test]
    fn release_is_idempotent() {
        let mut p = pad(50, 50);
        p.press_end();
        p.press_end();
        assert!(!p.is_drawing());
        assert!(p.is_empty());
    }

    #[test]
    fn segments_are_committed_per_move() {
        let mut p = pad(100, 100);
        p.press_start(Point::new(10.0, 50.0));
        p.press_move(Point::new(50.0, 50.0));
        assert!(p.surface().alpha_at(30, 50).unwrap() > 0);
        p.press_move(Point::new(50.0, 90.0));
        assert!(p.surface().alpha_at(50, 70).unwrap() > 0);
        assert_eq!(p.state().last, Some(Point::new(50.0, 90.0)));
    }

    #[test]
    fn clear_resets_state_but_keeps_style() {
        let style = StrokeStyle {
            color: Color::rgb(255, 0, 0),
            width: 4.0,
            ..StrokeStyle::default()
        };
        let mut p = SignaturePad::new(RasterSurface::new(60, 60).unwrap(), style.clone());
        p.press_start(Point::new(5.0, 5.0));
        p.press_move(Point::new(55.0, 55.0));
        p.clear();
        assert!(p.is_empty());
        assert!(!p.is_drawing());
        assert!(p.surface().is_blank());
        assert_eq!(p.style(), &style);
        p.clear();
        assert!(p.is_empty());
    }

    #[test]
    fn restyle_mid_stroke_keeps_earlier_ink() {
        let mut p = pad(100, 100);
        p.press_start(Point::new(10.0, 50.0));
        p.press_move(Point::new(40.0, 50.0));

        p.set_style(StrokeStyle {
            color: Color::rgb(255, 0, 0),
            width: 6.0,
            ..StrokeStyle::default()
        });
        assert!(!p.is_empty());
        assert!(p.is_drawing());
        p.press_move(Point::new(90.0, 50.0));
        p.press_end();

        let img = tiny_skia::Pixmap::decode_png(&p.surface().encode_png().unwrap()).unwrap();
        let old = img.pixel(25, 50).unwrap();
        assert!(old.alpha() > 0);
        assert!(old.blue() > old.red());
        // thin default pen leaves y=52 untouched, the 6px pen covers it
        assert_eq!(p.surface().alpha_at(25, 52), Some(0));
        assert!(p.surface().alpha_at(70, 52).unwrap() > 0);
        let new = img.pixel(70, 50).unwrap();
        assert_eq!((new.red(), new.green(), new.blue()), (255, 0, 0));
        assert!(!p.is_empty());
    }

    #[test]
    fn png_bytes_match_data_url() {
        let p = pad(16, 16);
        let bytes = p.export_png_bytes().unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let url = p.export_image().unwrap();
        assert!(url.starts_with(PNG_DATA_URL_PREFIX));
    }
}
