//! Raster-to-grid loading with a process-wide cache keyed by source.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use globe_common::{build_axis, GlobeError, GlobeResult, Grid, MaskedArray};
use metrics::histogram;
use raster_reader::synthetic::{equator_distance, equator_distance_key};
use raster_reader::{GeoTiffReader, RasterReader, RasterSource};
use serde::{Deserialize, Serialize};
use storage::{CacheStats, ResourceCache};
use tracing::{info, instrument};

use crate::config::{LoaderConfig, NodataConfig};

/// Label for the synthetic equator-distance field.
pub const EQUATOR_DISTANCE_LABEL: &str = "Distance to equator [deg]";

/// Where a grid comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridSource {
    /// Band 1 of a GeoTIFF file
    #[serde(rename = "geotiff")]
    GeoTiff { path: PathBuf },
    /// Global field of |latitude| generated in memory
    EquatorDistance { resolution_deg: f64 },
}

impl GridSource {
    pub fn geotiff(path: impl Into<PathBuf>) -> Self {
        GridSource::GeoTiff { path: path.into() }
    }

    /// Key this source is cached under.
    pub fn cache_key(&self) -> String {
        match self {
            GridSource::GeoTiff { path } => path.display().to_string(),
            GridSource::EquatorDistance { resolution_deg } => equator_distance_key(*resolution_deg),
        }
    }
}

/// Loads grids from rasters, reading each source at most once per process.
pub struct GridLoader {
    reader: Arc<dyn RasterReader>,
    config: LoaderConfig,
    cache: ResourceCache<String, Grid>,
}

impl GridLoader {
    /// Create a loader reading GeoTIFF files.
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_reader(Arc::new(GeoTiffReader::new()), config)
    }

    /// Create a loader with a custom raster reader.
    pub fn with_reader(reader: Arc<dyn RasterReader>, config: LoaderConfig) -> Self {
        Self {
            reader,
            config,
            cache: ResourceCache::new("grid"),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load the grid for a raster file.
    ///
    /// The first call for a path reads the file; later calls return the same
    /// `Arc` without touching the file system.
    pub async fn load_grid(&self, path: impl AsRef<Path>) -> GlobeResult<Arc<Grid>> {
        self.load(&GridSource::geotiff(path.as_ref())).await
    }

    /// Load the grid for any source.
    #[instrument(skip(self, source), fields(key = %source.cache_key()))]
    pub async fn load(&self, source: &GridSource) -> GlobeResult<Arc<Grid>> {
        let key = source.cache_key();
        self.cache
            .get_or_try_build(key, || self.read_grid(source.clone()))
            .await
    }

    /// Load several sources concurrently.
    ///
    /// Every outcome is returned in input order; a failure for one source does
    /// not hide the result of another.
    pub async fn load_all(&self, sources: &[GridSource]) -> Vec<GlobeResult<Arc<Grid>>> {
        join_all(sources.iter().map(|source| self.load(source))).await
    }

    /// Paths and synthetic keys that have been loaded.
    pub async fn loaded_keys(&self) -> Vec<String> {
        self.cache.keys().await
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    async fn read_grid(&self, source: GridSource) -> GlobeResult<Grid> {
        let start = Instant::now();
        let reader = self.reader.clone();
        let config = self.config.clone();

        let grid = tokio::task::spawn_blocking(move || -> GlobeResult<Grid> {
            match source {
                GridSource::GeoTiff { path } => {
                    let raster = reader.read(&path)?;
                    grid_from_raster(raster, Some(&config.nodata), config.label.clone())
                }
                GridSource::EquatorDistance { resolution_deg } => {
                    // Zero is a real value here (the equator), not a sentinel
                    let raster = equator_distance(resolution_deg)?;
                    grid_from_raster(raster, None, EQUATOR_DISTANCE_LABEL)
                }
            }
        })
        .await
        .map_err(|e| GlobeError::InternalError(format!("grid load task failed: {}", e)))??;

        let elapsed = start.elapsed();
        histogram!("globe_grid_load_seconds").record(elapsed.as_secs_f64());
        let (rows, cols) = grid.shape();
        info!(
            rows,
            cols,
            masked = grid.values().masked_count(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Grid loaded"
        );

        Ok(grid)
    }
}

/// Convert a decoded raster into a grid.
///
/// X runs from the left edge by `dx` and Y from the top edge by `-dy`, each
/// with exactly as many samples as the band has columns and rows. Samples
/// matching `nodata` are masked; non-finite samples are always masked.
pub fn grid_from_raster(
    raster: RasterSource,
    nodata: Option<&NodataConfig>,
    label: impl Into<String>,
) -> GlobeResult<Grid> {
    raster.validate()?;

    let bounds = raster.bounds;
    let res = raster.resolution;
    let x = build_axis(bounds.left(), bounds.right(), res.dx, raster.width);
    let y = build_axis(bounds.top(), bounds.bottom(), -res.dy, raster.height);

    let file_nodata = raster.nodata;
    let values = MaskedArray::from_values(raster.height, raster.width, raster.band, |v| {
        nodata.map_or(false, |policy| {
            policy.is_missing(v, policy.effective_sentinel(file_nodata))
        })
    })?;

    Grid::new(x, y, values, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use globe_common::{BoundingBox, Resolution};

    fn unit_raster() -> RasterSource {
        let mut band = vec![5.0f32; 16];
        band[0] = 0.0;
        RasterSource {
            path: "unit".to_string(),
            bounds: BoundingBox::new(0.0, 0.0, 4.0, 4.0),
            resolution: Resolution::new(1.0, 1.0),
            width: 4,
            height: 4,
            band,
            nodata: None,
        }
    }

    #[test]
    fn test_grid_from_raster_axes() {
        let grid = grid_from_raster(unit_raster(), Some(&NodataConfig::default()), "t").unwrap();
        assert_eq!(grid.x(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(grid.y(), &[4.0, 3.0, 2.0, 1.0]);
        assert_eq!(grid.label(), "t");
    }

    #[test]
    fn test_grid_from_raster_masks_sentinel_only() {
        let grid = grid_from_raster(unit_raster(), Some(&NodataConfig::default()), "t").unwrap();
        assert!(grid.values().is_masked(0, 0));
        assert_eq!(grid.values().masked_count(), 1);
        assert_eq!(grid.values().get(3, 3), Some(5.0));
    }

    #[test]
    fn test_grid_from_raster_rejects_short_band() {
        let mut raster = unit_raster();
        raster.band.truncate(10);
        let err = grid_from_raster(raster, Some(&NodataConfig::default()), "t").unwrap_err();
        assert!(matches!(err, GlobeError::InvalidRaster(_)));
    }

    #[test]
    fn test_grid_from_raster_without_policy_keeps_zeros() {
        let grid = grid_from_raster(unit_raster(), None, "t").unwrap();
        assert_eq!(grid.values().masked_count(), 0);
        assert_eq!(grid.values().get(0, 0), Some(0.0));
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(GridSource::geotiff("a/b.tif").cache_key(), "a/b.tif");
        assert_eq!(
            GridSource::EquatorDistance { resolution_deg: 5.0 }.cache_key(),
            "synthetic:equator@5"
        );
    }

    #[test]
    fn test_source_from_yaml() {
        let sources: Vec<GridSource> = serde_yaml::from_str(
            "- type: geotiff\n  path: tiff/tmin.tif\n- type: equator_distance\n  resolution_deg: 2.5\n",
        )
        .unwrap();
        assert_eq!(sources[0], GridSource::geotiff("tiff/tmin.tif"));
        assert_eq!(sources[1], GridSource::EquatorDistance { resolution_deg: 2.5 });
    }
}
