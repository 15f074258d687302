use crate::{error::FormError, style::StrokeStyle};

/// Position in surface-local pixels (origin at the top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width:  u32,
    pub height: u32
}

/// A raster target the signature pad draws on.
///
/// Every drawing call commits immediately; there is no buffered path.
pub trait Surface {
    fn size(&self) -> SurfaceSize;

    /// Set the pen used by subsequent `dot`/`segment` calls.
    fn apply_style(&mut self, style: &StrokeStyle);

    /// Ink a round dot of pen width centered at `at`.
    fn dot(&mut self, at: Point);

    /// Ink a straight segment.
    fn segment(&mut self, from: Point, to: Point);

    /// Erase everything back to transparent. Pen style is untouched.
    fn clear(&mut self);

    /// Current pixels as `data:image/png;base64,...`.
    fn to_png_data_url(&self) -> Result<String, FormError>;
}

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";
