use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::FormError;

/// Opaque RGB pen color, written as `#rrggbb` in configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS form, e.g. `#1e3a8a`.
    pub fn to_css(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || FormError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(bad)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| bad());
        match hex.len() {
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?
            )),
            // #rgb shorthand: each nibble is doubled
            3 => {
                let n = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
                Ok(Self::rgb(n(0)?, n(1)?, n(2)?))
            }
            _ => Err(bad())
        }
    }
}

impl TryFrom<String> for Color {
    type Error = FormError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_css()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square
}

impl LineCap {
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Miter,
    #[default]
    Round,
    Bevel
}

impl LineJoin {
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
            Self::Bevel => "bevel"
        }
    }
}

/// Pen settings applied to a drawing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub cap:   LineCap,
    pub join:  LineJoin
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::rgb(0x1e, 0x3a, 0x8a),
            width: 2.0,
            cap:   LineCap::Round,
            join:  LineJoin::Round
        }
    }
}
