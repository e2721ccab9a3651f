//! Common test fixtures for globe viewer tests.
//!
//! This module provides pre-defined extents and rasters that represent
//! common scenarios in the viewer.

/// Common bounding box definitions for testing, as (left, bottom, right, top).
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Continental United States bounding box
    pub const CONUS: (f64, f64, f64, f64) = (-130.0, 20.0, -60.0, 55.0);

    /// The 4x4 unit-cell raster used in end-to-end loader tests
    pub const UNIT_4X4: (f64, f64, f64, f64) = (0.0, 0.0, 4.0, 4.0);
}

/// Ready-made raster fixtures.
pub mod rasters {
    use crate::geotiff::GeoTiffFixture;
    use crate::generators::{create_grid_with_sentinels, create_temperature_grid};

    /// 4x4 raster over (0, 0, 4, 4) at 1-degree cells, value 5 except a
    /// sentinel 0 at row 0, col 0.
    pub fn unit_4x4_with_sentinel() -> GeoTiffFixture {
        GeoTiffFixture {
            width: 4,
            height: 4,
            left: 0.0,
            top: 4.0,
            dx: 1.0,
            dy: 1.0,
            values: create_grid_with_sentinels(4, 4, 5.0, 0.0, &[(0, 0)]),
            nodata: None,
        }
    }

    /// Coarse CONUS temperature raster (1-degree cells) with a few no-data cells.
    pub fn conus_temperature(offset: f32) -> GeoTiffFixture {
        let (width, height) = (70, 35);
        let mut values: Vec<f32> = create_temperature_grid(width, height)
            .into_iter()
            .map(|v| v + offset)
            .collect();
        // Ocean corners carry the sentinel
        for idx in [0, width - 1, (height - 1) * width] {
            values[idx] = 0.0;
        }
        GeoTiffFixture {
            width,
            height,
            left: -130.0,
            top: 55.0,
            dx: 1.0,
            dy: 1.0,
            values,
            nodata: Some("0".to_string()),
        }
    }
}
