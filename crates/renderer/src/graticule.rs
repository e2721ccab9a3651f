//! Latitude/longitude line overlays.

use serde::Serialize;

use crate::mesh::lonlat_to_xyz;

/// Default spacing between graticule lines, in degrees.
pub const DEFAULT_STEP_DEG: f64 = 30.0;

/// Spacing between samples along each line, in degrees
const SAMPLE_STEP_DEG: f64 = 2.0;

/// One graticule line, as lon/lat samples and their positions on the sphere.
#[derive(Debug, Clone, Serialize)]
pub struct GraticuleLine {
    /// Fixed longitude (meridian) or latitude (parallel) of the line
    pub value_deg: f64,
    pub lonlat: Vec<(f64, f64)>,
    pub points: Vec<[f32; 3]>,
}

/// Meridians and parallels at a fixed spacing.
#[derive(Debug, Clone, Serialize)]
pub struct Graticule {
    pub step_deg: f64,
    pub meridians: Vec<GraticuleLine>,
    pub parallels: Vec<GraticuleLine>,
}

impl Graticule {
    /// Lines every `step_deg` degrees, lifted to `radius`.
    ///
    /// Meridians run pole to pole; parallels exclude the poles themselves.
    pub fn new(step_deg: f64, radius: f64) -> Self {
        let step_deg = if step_deg.is_finite() && step_deg > 0.0 {
            step_deg
        } else {
            DEFAULT_STEP_DEG
        };

        let meridians = multiples(-180.0, 180.0, step_deg, false)
            .into_iter()
            .map(|lon| {
                let lonlat = samples(-90.0, 90.0).map(|lat| (lon, lat)).collect();
                line(lon, lonlat, radius)
            })
            .collect();

        let parallels = multiples(-90.0, 90.0, step_deg, true)
            .into_iter()
            .filter(|lat| lat.abs() < 90.0)
            .map(|lat| {
                let lonlat = samples(-180.0, 180.0).map(|lon| (lon, lat)).collect();
                line(lat, lonlat, radius)
            })
            .collect();

        Self {
            step_deg,
            meridians,
            parallels,
        }
    }

    pub fn line_count(&self) -> usize {
        self.meridians.len() + self.parallels.len()
    }

    /// Angular distance in degrees from a lon/lat point to the nearest line.
    pub fn distance_deg(&self, lon: f64, lat: f64) -> f64 {
        let to_grid = |v: f64| {
            let r = v.rem_euclid(self.step_deg);
            r.min(self.step_deg - r)
        };
        let along_parallel = to_grid(lat);
        // Meridians converge toward the poles
        let along_meridian = to_grid(lon) * lat.to_radians().cos().abs();
        along_parallel.min(along_meridian)
    }
}

fn multiples(start: f64, stop: f64, step: f64, inclusive: bool) -> Vec<f64> {
    let first = (start / step).ceil() as i64;
    let last = (stop / step).floor() as i64;
    (first..=last)
        .map(|k| k as f64 * step)
        .filter(|&v| inclusive || v < stop)
        .collect()
}

fn samples(start: f64, stop: f64) -> impl Iterator<Item = f64> {
    let n = ((stop - start) / SAMPLE_STEP_DEG).round() as usize;
    (0..=n).map(move |i| start + i as f64 * SAMPLE_STEP_DEG)
}

fn line(value_deg: f64, lonlat: Vec<(f64, f64)>, radius: f64) -> GraticuleLine {
    let points = lonlat
        .iter()
        .map(|&(lon, lat)| {
            let [x, y, z] = lonlat_to_xyz(lon, lat, radius);
            [x as f32, y as f32, z as f32]
        })
        .collect();
    GraticuleLine {
        value_deg,
        lonlat,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spacing_line_counts() {
        let g = Graticule::new(DEFAULT_STEP_DEG, 1.0);
        // -180, -150, ..., 150
        assert_eq!(g.meridians.len(), 12);
        // -60, -30, 0, 30, 60
        assert_eq!(g.parallels.len(), 5);
        assert_eq!(g.line_count(), 17);
    }

    #[test]
    fn test_meridian_runs_pole_to_pole() {
        let g = Graticule::new(30.0, 1.0);
        let m = &g.meridians[0];
        assert_eq!(m.value_deg, -180.0);
        assert_eq!(m.lonlat.first(), Some(&(-180.0, -90.0)));
        assert_eq!(m.lonlat.last(), Some(&(-180.0, 90.0)));
        assert_eq!(m.points.len(), m.lonlat.len());
    }

    #[test]
    fn test_distance_to_lines() {
        let g = Graticule::new(30.0, 1.0);
        assert_eq!(g.distance_deg(-95.0, 30.0), 0.0);
        assert_eq!(g.distance_deg(-90.0, 10.0), 0.0);
        assert!(g.distance_deg(-105.0, 45.0) > 5.0);
    }

    #[test]
    fn test_invalid_step_falls_back() {
        let g = Graticule::new(0.0, 1.0);
        assert_eq!(g.step_deg, DEFAULT_STEP_DEG);
    }
}
