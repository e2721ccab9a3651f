//! Raster reading for georeferenced single-band data.
//!
//! Provides the [`RasterReader`] seam used by the grid loader, a GeoTIFF
//! implementation backed by the `tiff` crate, and in-memory synthetic fields.
//!
//! # GeoTIFF Support
//!
//! Only north-up rasters are handled: georeferencing must come from a pixel
//! scale plus tiepoint, or from a model transformation without rotation. The
//! first image in the file is treated as band 1 and must be grayscale; sample
//! formats are widened or narrowed to `f32`.

pub mod error;
pub mod geotiff;
pub mod source;
pub mod synthetic;

use std::path::Path;

pub use error::{RasterError, RasterResult};
pub use geotiff::GeoTiffReader;
pub use source::RasterSource;

/// Reads band 1 of a raster file.
///
/// Reading is blocking; async callers should run it on a blocking thread.
pub trait RasterReader: Send + Sync {
    fn read(&self, path: &Path) -> RasterResult<RasterSource>;
}
