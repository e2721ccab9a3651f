//! Sampling a lon/lat grid onto the sphere as a colored surface.

use globe_common::{GlobeError, GlobeResult, GradientConfig, Grid};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Radius of the base imagery sphere.
pub const BASE_RADIUS: f64 = 1.0;

/// Radius the data surface is lifted to so it draws above the base imagery.
pub const DATA_RADIUS: f64 = 1.001;

/// Radius for line overlays, above the data surface.
pub const OVERLAY_RADIUS: f64 = 1.002;

/// Minimum grid size (per axis) that produces at least one face
const MIN_AXIS_LEN: usize = 2;

/// Cartesian position of a lon/lat point (degrees) on a sphere, Z up.
///
/// Longitude 0 lies on +X and longitude 90 on +Y.
pub fn lonlat_to_xyz(lon_deg: f64, lat_deg: f64, radius: f64) -> [f64; 3] {
    let (slon, clon) = lon_deg.to_radians().sin_cos();
    let (slat, clat) = lat_deg.to_radians().sin_cos();
    [radius * clat * clon, radius * clat * slon, radius * slat]
}

/// Inverse of [`lonlat_to_xyz`] for a point on or near the sphere.
pub fn xyz_to_lonlat(p: [f64; 3]) -> (f64, f64) {
    let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
    if r == 0.0 {
        return (0.0, 0.0);
    }
    let lat = (p[2] / r).clamp(-1.0, 1.0).asin().to_degrees();
    let lon = p[1].atan2(p[0]).to_degrees();
    (lon, lat)
}

/// A structured quad mesh on the sphere with one scalar and color per node.
#[derive(Debug, Clone, Serialize)]
pub struct SurfaceMesh {
    /// Grid (rows, cols) the nodes were sampled from
    pub shape: (usize, usize),
    /// Node positions, row-major
    pub points: Vec<[f32; 3]>,
    /// Quads as node indices, counter-clockwise seen from outside
    pub faces: Vec<[u32; 4]>,
    /// Node values, NaN where missing
    pub scalars: Vec<f32>,
    /// Node colors from the color scale; alpha 0 where missing
    pub colors: Vec<[u8; 4]>,
    /// Display name of the scalar field
    pub name: String,
}

impl SurfaceMesh {
    /// Build the mesh for `grid`, coloring nodes with `colormap`.
    ///
    /// The grid axes are read as longitude (X) and latitude (Y) in degrees.
    pub fn from_grid(grid: &Grid, colormap: &GradientConfig, radius: f64) -> GlobeResult<Self> {
        let (rows, cols) = grid.shape();
        if rows < MIN_AXIS_LEN || cols < MIN_AXIS_LEN {
            return Err(GlobeError::SceneBuildError(format!(
                "grid of {}x{} is too small for a surface",
                rows, cols
            )));
        }
        check_geographic(grid)?;
        colormap.validate().map_err(GlobeError::SceneBuildError)?;

        let (x, y) = (grid.x(), grid.y());
        let points: Vec<[f32; 3]> = (0..rows * cols)
            .into_par_iter()
            .map(|idx| {
                let [px, py, pz] = lonlat_to_xyz(x[idx % cols], y[idx / cols], radius);
                [px as f32, py as f32, pz as f32]
            })
            .collect();

        let faces = quad_faces(rows, cols);
        let scalars = grid.values().to_nan_filled();
        let colors: Vec<[u8; 4]> = scalars
            .par_iter()
            .map(|&v| {
                let value = if v.is_nan() { None } else { Some(v as f64) };
                colormap.color_for(value).to_array()
            })
            .collect();

        debug!(
            rows,
            cols,
            faces = faces.len(),
            missing = grid.values().masked_count(),
            "Built surface mesh"
        );

        Ok(Self {
            shape: (rows, cols),
            points,
            faces,
            scalars,
            colors,
            name: grid.label().to_string(),
        })
    }

    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    /// Nodes that carry a finite value.
    pub fn valid_count(&self) -> usize {
        self.scalars.iter().filter(|v| !v.is_nan()).count()
    }
}

fn quad_faces(rows: usize, cols: usize) -> Vec<[u32; 4]> {
    let mut faces = Vec::with_capacity((rows - 1) * (cols - 1));
    for r in 0..rows - 1 {
        for c in 0..cols - 1 {
            let i = (r * cols + c) as u32;
            let below = i + cols as u32;
            faces.push([i, below, below + 1, i + 1]);
        }
    }
    faces
}

fn check_geographic(grid: &Grid) -> GlobeResult<()> {
    let bounds = grid
        .coordinate_bounds()
        .ok_or_else(|| GlobeError::InvalidBounds("grid has empty axes".to_string()))?;
    if bounds.min_y < -90.0 || bounds.max_y > 90.0 {
        return Err(GlobeError::InvalidBounds(format!(
            "latitudes [{}, {}] fall outside [-90, 90]",
            bounds.min_y, bounds.max_y
        )));
    }
    if bounds.min_x < -360.0 || bounds.max_x > 360.0 {
        return Err(GlobeError::InvalidBounds(format!(
            "longitudes [{}, {}] fall outside [-360, 360]",
            bounds.min_x, bounds.max_x
        )));
    }
    Ok(())
}
