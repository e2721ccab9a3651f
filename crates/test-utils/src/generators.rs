//! Test data generators for creating synthetic raster data.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

/// Creates a test grid with temperature-like values in Celsius.
///
/// Values run from about -30C in the top-left corner to +30C in the
/// bottom-right, so both ends of a [-20, 20] color range get exercised.
pub fn create_temperature_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f32 / width.max(1) as f32;
            let y_factor = row as f32 / height.max(1) as f32;
            data.push(-30.0 + (x_factor * 30.0) + (y_factor * 30.0));
        }
    }
    data
}

/// Creates a constant grid with a sentinel value at specified positions.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `value` - Fill value for valid cells
/// * `sentinel` - No-data value to place
/// * `positions` - List of (row, col) positions holding the sentinel
pub fn create_grid_with_sentinels(
    width: usize,
    height: usize,
    value: f32,
    sentinel: f32,
    positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![value; width * height];
    for &(row, col) in positions {
        if col < width && row < height {
            data[row * width + col] = sentinel;
        }
    }
    data
}
