//! In-memory representation of a decoded single-band raster.

use globe_common::{BoundingBox, Resolution};

use crate::error::{RasterError, RasterResult};

/// Band 1 of a georeferenced raster plus its georeferencing.
///
/// Samples are row-major with row 0 at the top (north) edge.
#[derive(Debug, Clone)]
pub struct RasterSource {
    /// Identifier the raster was read from (file path or synthetic key)
    pub path: String,
    /// Outer edges of the raster (left, bottom, right, top)
    pub bounds: BoundingBox,
    /// Cell size as positive magnitudes
    pub resolution: Resolution,
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// Band 1 samples
    pub band: Vec<f32>,
    /// No-data value declared by the file, if any
    pub nodata: Option<f64>,
}

impl RasterSource {
    /// Check that the georeferencing describes a regular grid matching the band.
    pub fn validate(&self) -> RasterResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RasterError::MissingBand(format!(
                "{} has an empty band ({}x{})",
                self.path, self.width, self.height
            )));
        }
        if self.band.len() != self.width * self.height {
            return Err(RasterError::MissingBand(format!(
                "{}: band holds {} samples, expected {}x{}",
                self.path,
                self.band.len(),
                self.width,
                self.height
            )));
        }
        if !self.resolution.is_valid() {
            return Err(RasterError::MalformedBounds(format!(
                "{}: resolution ({}, {}) must be finite and positive",
                self.path, self.resolution.dx, self.resolution.dy
            )));
        }
        if !self.bounds.is_well_formed() {
            return Err(RasterError::MalformedBounds(format!(
                "{}: bounds {:?} are inverted or non-finite",
                self.path, self.bounds
            )));
        }
        Ok(())
    }

    /// Sample at (row, col), if in range.
    pub fn sample(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.band.get(row * self.width + col).copied()
    }
}
