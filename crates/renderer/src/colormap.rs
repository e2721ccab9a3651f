//! Color scales for the data layer.

use globe_common::{Color, ColorStop, GradientConfig, OutOfRangeBehavior};

/// Display range for temperature grids, in degrees Celsius.
pub const TEMPERATURE_RANGE: (f64, f64) = (-20.0, 20.0);

/// Cool-to-warm diverging scale (blue through light grey to red).
const COOLWARM: [(f64, [u8; 3]); 9] = [
    (0.0, [59, 76, 192]),
    (0.125, [98, 130, 234]),
    (0.25, [141, 176, 254]),
    (0.375, [184, 208, 249]),
    (0.5, [221, 221, 221]),
    (0.625, [245, 196, 173]),
    (0.75, [244, 154, 123]),
    (0.875, [222, 96, 77]),
    (1.0, [180, 4, 38]),
];

/// Diverging cool-warm gradient over `[min, max]`.
///
/// Values outside the range clamp to the end colors; missing values are fully
/// transparent.
pub fn coolwarm(min: f64, max: f64) -> GradientConfig {
    GradientConfig {
        stops: COOLWARM
            .iter()
            .map(|&(position, [r, g, b])| ColorStop::new(position, Color::rgb(r, g, b)))
            .collect(),
        min_value: min,
        max_value: max,
        out_of_range: OutOfRangeBehavior::Clamp,
        nan_color: Color::transparent(),
    }
}

/// The cool-warm scale over [`TEMPERATURE_RANGE`].
pub fn temperature() -> GradientConfig {
    coolwarm(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1)
}
