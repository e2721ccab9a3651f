//! Gridded datasets with coordinate axes and masked values.

use crate::{BoundingBox, GlobeError, GlobeResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Pixel resolution of a raster, as positive magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Cell width (X / longitude direction)
    pub dx: f64,
    /// Cell height (Y / latitude direction)
    pub dy: f64,
}

impl Resolution {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Both steps are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite() && self.dx > 0.0 && self.dy > 0.0
    }
}

/// Number of samples `start, start + step, ...` strictly short of `stop`.
pub fn arange_len(start: f64, stop: f64, step: f64) -> usize {
    if step == 0.0 || !step.is_finite() {
        return 0;
    }
    let n = ((stop - start) / step).ceil();
    if n.is_finite() && n > 0.0 {
        n as usize
    } else {
        0
    }
}

/// Distance the last of `len` samples lies beyond `stop`, measured along `step`.
///
/// `None` while every sample stays short of the far edge.
pub fn axis_overshoot(start: f64, stop: f64, step: f64, len: usize) -> Option<f64> {
    if len == 0 || step == 0.0 || !step.is_finite() {
        return None;
    }
    let last = start + (len - 1) as f64 * step;
    let past = (last - stop) * step.signum();
    (past >= 0.0).then_some(past)
}

/// Build a coordinate axis of exactly `len` samples starting at `start`.
///
/// The half-open range `[start, stop)` stepped by `step` may disagree with the
/// array dimension by a cell either way; the axis is then truncated or extended
/// along the same step so that it always matches `len`. An extension that
/// reaches past `stop` leaves the raster's bounding box and is logged at warn.
pub fn build_axis(start: f64, stop: f64, step: f64, len: usize) -> Vec<f64> {
    let natural = arange_len(start, stop, step);
    if natural != len {
        match axis_overshoot(start, stop, step, len) {
            Some(overshoot) => warn!(
                start,
                stop,
                step,
                natural,
                expected = len,
                overshoot,
                "Axis extended past raster bounds"
            ),
            None => debug!(
                start,
                stop,
                step,
                natural,
                expected = len,
                "Fitting axis length to array dimension"
            ),
        }
    }
    (0..len).map(|i| start + i as f64 * step).collect()
}

/// A row-major 2D array with an explicit missing-value mask.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray {
    rows: usize,
    cols: usize,
    values: Vec<f32>,
    mask: Vec<bool>,
}

impl MaskedArray {
    /// Create an array from values and a mask (`true` = missing).
    pub fn new(rows: usize, cols: usize, values: Vec<f32>, mask: Vec<bool>) -> GlobeResult<Self> {
        if values.len() != rows * cols || mask.len() != values.len() {
            return Err(GlobeError::InvalidRaster(format!(
                "array of {} values / {} mask entries does not fit {}x{}",
                values.len(),
                mask.len(),
                rows,
                cols
            )));
        }
        Ok(Self {
            rows,
            cols,
            values,
            mask,
        })
    }

    /// Create an array, masking every value for which `is_missing` holds.
    ///
    /// Non-finite values are always masked.
    pub fn from_values<F>(rows: usize, cols: usize, values: Vec<f32>, is_missing: F) -> GlobeResult<Self>
    where
        F: Fn(f32) -> bool,
    {
        let mask = values
            .iter()
            .map(|&v| !v.is_finite() || is_missing(v))
            .collect();
        Self::new(rows, cols, values, mask)
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at (row, col), or `None` when masked or out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let idx = row * self.cols + col;
        if self.mask[idx] {
            None
        } else {
            Some(self.values[idx])
        }
    }

    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.mask[row * self.cols + col]
    }

    pub fn masked_count(&self) -> usize {
        self.mask.iter().filter(|m| **m).count()
    }

    /// Iterate values in row-major order, `None` for masked cells.
    pub fn iter(&self) -> impl Iterator<Item = Option<f32>> + '_ {
        self.values
            .iter()
            .zip(&self.mask)
            .map(|(&v, &m)| if m { None } else { Some(v) })
    }

    /// Min/max over unmasked values.
    pub fn valid_range(&self) -> Option<(f32, f32)> {
        self.iter().flatten().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Raw values with masked cells replaced by NaN.
    pub fn to_nan_filled(&self) -> Vec<f32> {
        self.iter().map(|v| v.unwrap_or(f32::NAN)).collect()
    }
}

/// A gridded dataset: 1D coordinate axes plus a masked value array.
#[derive(Debug, Clone)]
pub struct Grid {
    x: Vec<f64>,
    y: Vec<f64>,
    values: MaskedArray,
    label: String,
}

impl Grid {
    /// Create a grid, checking that axes match the array and are strictly monotonic.
    pub fn new(
        x: Vec<f64>,
        y: Vec<f64>,
        values: MaskedArray,
        label: impl Into<String>,
    ) -> GlobeResult<Self> {
        let (rows, cols) = values.shape();
        if x.len() != cols || y.len() != rows {
            return Err(GlobeError::ShapeMismatch {
                expected: (rows, cols),
                actual: (y.len(), x.len()),
            });
        }
        if !is_strictly_monotonic(&x) {
            return Err(GlobeError::InvalidBounds("x axis is not strictly monotonic".into()));
        }
        if !is_strictly_monotonic(&y) {
            return Err(GlobeError::InvalidBounds("y axis is not strictly monotonic".into()));
        }

        Ok(Self {
            x,
            y,
            values,
            label: label.into(),
        })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn values(&self) -> &MaskedArray {
        &self.values
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }

    /// Extent spanned by the coordinate samples.
    pub fn coordinate_bounds(&self) -> Option<BoundingBox> {
        let (x0, x1) = (self.x.first()?, self.x.last()?);
        let (y0, y1) = (self.y.first()?, self.y.last()?);
        Some(BoundingBox::new(x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1)))
    }
}

fn is_strictly_monotonic(axis: &[f64]) -> bool {
    if axis.iter().any(|v| !v.is_finite()) {
        return false;
    }
    let increasing = axis.windows(2).all(|w| w[1] > w[0]);
    let decreasing = axis.windows(2).all(|w| w[1] < w[0]);
    increasing || decreasing
}
