//! Error types for raster reading operations.

use globe_common::GlobeError;
use thiserror::Error;

/// Result type for raster reader operations.
pub type RasterResult<T> = Result<T, RasterError>;

/// Error types for raster reading.
#[derive(Error, Debug)]
pub enum RasterError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The TIFF container could not be decoded
    #[error("TIFF decoding failed: {0}")]
    Decode(String),

    /// No usable georeferencing tags
    #[error("Missing georeference: {0}")]
    MissingGeoreference(String),

    /// Raster has no single numeric band to read
    #[error("Missing band: {0}")]
    MissingBand(String),

    /// Bounds or resolution that cannot describe a regular grid
    #[error("Malformed bounds: {0}")]
    MalformedBounds(String),

    /// Layout the reader does not handle (rotated transforms, multi-sample pixels)
    #[error("Unsupported raster layout: {0}")]
    Unsupported(String),
}

impl From<tiff::TiffError> for RasterError {
    fn from(err: tiff::TiffError) -> Self {
        match err {
            tiff::TiffError::IoError(e) => RasterError::IoError(e),
            other => RasterError::Decode(other.to_string()),
        }
    }
}

impl From<RasterError> for GlobeError {
    fn from(err: RasterError) -> Self {
        match err {
            RasterError::IoError(e) => GlobeError::DataReadError(e.to_string()),
            RasterError::MalformedBounds(msg) => GlobeError::InvalidBounds(msg),
            other => GlobeError::InvalidRaster(other.to_string()),
        }
    }
}
