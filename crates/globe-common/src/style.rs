//! Colors and drawing styles for scene layers.
//!
//! Colors serialize as `#RRGGBBAA` strings and accept hex strings, RGB(A)
//! arrays, or a small set of named colors on input.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorSpec", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse "#RRGGBB" or "#RRGGBBAA".
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim_start_matches('#');
        let byte = |i: usize| u8::from_str_radix(s.get(i..i + 2)?, 16).ok();
        match s.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name.to_lowercase().as_str() {
            "transparent" => Self::transparent(),
            "black" | "k" => Self::BLACK,
            "white" | "w" => Self::WHITE,
            "red" | "r" => Self::rgb(255, 0, 0),
            "green" | "g" => Self::rgb(0, 128, 0),
            "blue" | "b" => Self::rgb(0, 0, 255),
            "yellow" | "y" => Self::rgb(255, 255, 0),
            "cyan" | "c" => Self::rgb(0, 255, 255),
            "magenta" | "m" => Self::rgb(255, 0, 255),
            "orange" => Self::rgb(255, 165, 0),
            "pink" => Self::rgb(255, 192, 203),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            _ => return None,
        };
        Some(color)
    }

    /// Same color with alpha scaled by `opacity` in [0, 1].
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Linear interpolation between two colors.
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let lerp_u8 = |a: u8, b: u8| -> u8 { ((a as f64) * (1.0 - t) + (b as f64) * t).round() as u8 };
        Color::new(
            lerp_u8(self.r, other.r),
            lerp_u8(self.g, other.g),
            lerp_u8(self.b, other.b),
            lerp_u8(self.a, other.a),
        )
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Accepted input representations for [`Color`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ColorSpec {
    /// Hex string or color name
    Text(String),

    /// RGB array: [r, g, b] or [r, g, b, a]
    Array(Vec<u8>),
}

impl TryFrom<ColorSpec> for Color {
    type Error = String;

    fn try_from(spec: ColorSpec) -> Result<Self, Self::Error> {
        match spec {
            ColorSpec::Text(s) if s.starts_with('#') => {
                Color::from_hex(&s).ok_or_else(|| format!("invalid hex color '{}'", s))
            }
            ColorSpec::Text(s) => Color::from_name(&s).ok_or_else(|| format!("unknown color '{}'", s)),
            ColorSpec::Array(arr) => match arr.as_slice() {
                [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Color::new(*r, *g, *b, *a)),
                _ => Err(format!("color array must have 3 or 4 entries, got {}", arr.len())),
            },
        }
    }
}

/// Style for polyline overlays (graticule, coastlines).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Color,
    pub opacity: f64,
    pub line_width: f32,
}

impl LineStyle {
    pub fn new(color: Color, opacity: f64, line_width: f32) -> Self {
        Self {
            color,
            opacity,
            line_width,
        }
    }
}

/// Style for text annotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub color: Color,
    pub font_size: u32,
    pub shadow: bool,
}

/// A color stop in a gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position of the stop, in [0, 1] along the gradient
    pub position: f64,

    /// The color at this stop
    pub color: Color,
}

impl ColorStop {
    pub fn new(position: f64, color: Color) -> Self {
        Self { position, color }
    }
}

/// Behavior for values outside the gradient range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangeBehavior {
    #[default]
    Clamp,
    Transparent,
}

/// Continuous gradient mapping a value range onto color stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientConfig {
    /// Color stops, positions ascending from 0 to 1
    pub stops: Vec<ColorStop>,

    /// Value mapped to position 0
    pub min_value: f64,

    /// Value mapped to position 1
    pub max_value: f64,

    /// How to handle values outside the range
    #[serde(default)]
    pub out_of_range: OutOfRangeBehavior,

    /// Color for missing values
    #[serde(default = "Color::transparent")]
    pub nan_color: Color,
}

impl GradientConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.stops.len() < 2 {
            return Err("Gradient must have at least 2 color stops".to_string());
        }

        for i in 1..self.stops.len() {
            if self.stops[i].position <= self.stops[i - 1].position {
                return Err("Color stops must be in ascending position order".to_string());
            }
        }

        if !(self.max_value > self.min_value) {
            return Err(format!(
                "Gradient range [{}, {}] is empty",
                self.min_value, self.max_value
            ));
        }

        Ok(())
    }

    /// Color for a value; `None` renders with `nan_color`.
    pub fn color_for(&self, value: Option<f64>) -> Color {
        let value = match value {
            Some(v) if v.is_finite() => v,
            _ => return self.nan_color,
        };

        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return self.nan_color,
        };

        if value < self.min_value || value > self.max_value {
            if self.out_of_range == OutOfRangeBehavior::Transparent {
                return Color::transparent();
            }
        }

        let span = self.max_value - self.min_value;
        let t = ((value - self.min_value) / span).clamp(0.0, 1.0);

        if t <= first.position {
            return first.color;
        }

        // Find bracketing stops
        for pair in self.stops.windows(2) {
            let (low, high) = (&pair[0], &pair[1]);
            if t <= high.position {
                let local = (t - low.position) / (high.position - low.position);
                return low.color.lerp(&high.color, local);
            }
        }

        last.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stop() -> GradientConfig {
        GradientConfig {
            stops: vec![
                ColorStop::new(0.0, Color::rgb(0, 0, 255)),
                ColorStop::new(1.0, Color::rgb(255, 0, 0)),
            ],
            min_value: -20.0,
            max_value: 20.0,
            out_of_range: OutOfRangeBehavior::Clamp,
            nan_color: Color::WHITE.with_opacity(0.0),
        }
    }

    #[test]
    fn test_hex_roundtrip() {
        let c = Color::from_hex("#0e1117").unwrap();
        assert_eq!(c, Color::rgb(14, 17, 23));
        assert_eq!(c.to_string(), "#0e1117ff");
        assert_eq!(Color::from_hex("#0e1117ff"), Some(c));
        assert_eq!(Color::from_hex("#0e11"), None);
    }

    #[test]
    fn test_color_deserialize_variants() {
        let c: Color = serde_json::from_str("\"pink\"").unwrap();
        assert_eq!(c, Color::rgb(255, 192, 203));
        let c: Color = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(c, Color::rgb(1, 2, 3));
        assert!(serde_json::from_str::<Color>("\"no-such-color\"").is_err());
    }

    #[test]
    fn test_gradient_clamps_and_masks() {
        let g = two_stop();
        assert!(g.validate().is_ok());
        assert_eq!(g.color_for(Some(-50.0)), Color::rgb(0, 0, 255));
        assert_eq!(g.color_for(Some(50.0)), Color::rgb(255, 0, 0));
        assert_eq!(g.color_for(Some(0.0)), Color::rgb(128, 0, 128));
        assert_eq!(g.color_for(None).a, 0);
        assert_eq!(g.color_for(Some(f64::NAN)).a, 0);
    }

    #[test]
    fn test_gradient_transparent_out_of_range() {
        let g = GradientConfig {
            out_of_range: OutOfRangeBehavior::Transparent,
            ..two_stop()
        };
        assert_eq!(g.color_for(Some(21.0)), Color::transparent());
        assert_eq!(g.color_for(Some(20.0)), Color::rgb(255, 0, 0));
    }
}
