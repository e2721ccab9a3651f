//! Synthetic rasters generated in memory.

use globe_common::{BoundingBox, Resolution};

use crate::error::{RasterError, RasterResult};
use crate::source::RasterSource;

/// Key prefix for synthetic sources in caches and logs.
pub const SYNTHETIC_PREFIX: &str = "synthetic:";

/// Finest synthetic resolution accepted, in degrees.
pub const MIN_RESOLUTION_DEG: f64 = 0.01;

/// Coarsest synthetic resolution accepted, in degrees.
pub const MAX_RESOLUTION_DEG: f64 = 90.0;

/// Whether `resolution_deg` yields a global field of bounded size.
pub fn is_valid_resolution(resolution_deg: f64) -> bool {
    resolution_deg.is_finite()
        && (MIN_RESOLUTION_DEG..=MAX_RESOLUTION_DEG).contains(&resolution_deg)
}

/// Cache key for the equator-distance field at a resolution.
pub fn equator_distance_key(resolution_deg: f64) -> String {
    format!("{}equator@{}", SYNTHETIC_PREFIX, resolution_deg)
}

/// Global lon/lat raster whose value is the distance to the equator in degrees.
///
/// Sample (row, col) sits at `(-180 + col * res, 90 - row * res)` and holds
/// `|latitude|`, so the field is 90 at the poles and 0 along the equator.
pub fn equator_distance(resolution_deg: f64) -> RasterResult<RasterSource> {
    if !is_valid_resolution(resolution_deg) {
        return Err(RasterError::MalformedBounds(format!(
            "synthetic resolution {} must be in [{}, {}]",
            resolution_deg, MIN_RESOLUTION_DEG, MAX_RESOLUTION_DEG
        )));
    }

    let width = (360.0 / resolution_deg).round() as usize;
    let height = (180.0 / resolution_deg).round() as usize;

    let mut band = Vec::with_capacity(width * height);
    for row in 0..height {
        let lat = 90.0 - row as f64 * resolution_deg;
        band.extend(std::iter::repeat(lat.abs() as f32).take(width));
    }

    let source = RasterSource {
        path: equator_distance_key(resolution_deg),
        bounds: BoundingBox::global(),
        resolution: Resolution::new(resolution_deg, resolution_deg),
        width,
        height,
        band,
        nodata: None,
    };
    source.validate()?;
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_distance_shape() {
        let src = equator_distance(10.0).unwrap();
        assert_eq!(src.width, 36);
        assert_eq!(src.height, 18);
        assert_eq!(src.band.len(), 36 * 18);
        assert_eq!(src.path, "synthetic:equator@10");
    }

    #[test]
    fn test_equator_distance_values() {
        let src = equator_distance(10.0).unwrap();
        assert_eq!(src.sample(0, 0), Some(90.0));
        assert_eq!(src.sample(9, 5), Some(0.0));
        assert_eq!(src.sample(17, 35), Some(80.0));
    }

    #[test]
    fn test_equator_distance_rejects_bad_resolution() {
        assert!(equator_distance(0.0).is_err());
        assert!(equator_distance(-1.0).is_err());
        assert!(equator_distance(f64::NAN).is_err());
        assert!(equator_distance(1e-7).is_err());
        assert!(equator_distance(90.5).is_err());
        assert!(is_valid_resolution(MIN_RESOLUTION_DEG));
    }
}
