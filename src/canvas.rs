use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::{
    error::FormError,
    style::StrokeStyle,
    surface::{Point, Surface, SurfaceSize}
};

/// `<canvas>` element with its persistent 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx:    CanvasRenderingContext2d
}

impl CanvasSurface {
    /// Size the backing store to the element's on-screen box and grab
    /// its 2D context.
    ///
    /// The box is taken in CSS pixels; device pixel ratio is ignored, so
    /// exports match what the layout reports.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, FormError> {
        let rect = canvas.get_bounding_client_rect();
        canvas.set_width(rect.width().max(0.0) as u32);
        canvas.set_height(rect.height().max(0.0) as u32);

        let ctx = canvas
            .get_context("2d")
            .map_err(|_| FormError::NoContext2d)?
            .ok_or(FormError::NoContext2d)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| FormError::NoContext2d)?;

        Ok(Self { canvas, ctx })
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> SurfaceSize {
        SurfaceSize {
            width:  self.canvas.width(),
            height: self.canvas.height()
        }
    }

    fn apply_style(&mut self, style: &StrokeStyle) {
        let color = style.color.to_css();
        self.ctx.set_stroke_style_str(&color);
        self.ctx.set_fill_style_str(&color);
        self.ctx.set_line_width(style.width);
        self.ctx.set_line_cap(style.cap.as_css());
        self.ctx.set_line_join(style.join.as_css());
    }

    fn dot(&mut self, at: Point) {
        let radius = (self.ctx.line_width() / 2.0).max(0.5);
        self.ctx.begin_path();
        let _ = self.ctx.arc(at.x, at.y, radius, 0.0, TAU);
        self.ctx.fill();
    }

    fn segment(&mut self, from: Point, to: Point) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn clear(&mut self) {
        let w = f64::from(self.canvas.width());
        let h = f64::from(self.canvas.height());
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn to_png_data_url(&self) -> Result<String, FormError> {
        self.canvas
            .to_data_url_with_type("image/png")
            .map_err(|_| FormError::OpFailed("toDataURL".into()))
    }
}
