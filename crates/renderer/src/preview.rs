//! Orthographic raster previews of a globe panel.
//!
//! Each pixel inside the globe disc is traced back to a lon/lat on the unit
//! sphere; the visible layers are then composited back to front (base color,
//! data surface, graticule).

use globe_common::{Color, GradientConfig, Grid, LineStyle};
use rayon::prelude::*;

use crate::graticule::Graticule;
use crate::mesh::xyz_to_lonlat;

/// Fraction of the shorter image side covered by the globe's diameter
const DISC_FILL: f64 = 0.9;

/// Camera view direction and up vector, both in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBasis {
    /// Unit vector from the camera toward the focal point
    pub forward: [f64; 3],
    /// Unit vector pointing up on screen
    pub up: [f64; 3],
}

/// Grid and color scale for the data surface.
pub struct DataOverlay<'a> {
    pub grid: &'a Grid,
    pub colormap: &'a GradientConfig,
}

/// Graticule lines and how to stroke them.
pub struct GraticuleOverlay<'a> {
    pub graticule: &'a Graticule,
    pub style: LineStyle,
}

/// Everything needed to draw one preview.
pub struct PreviewRequest<'a> {
    pub width: usize,
    pub height: usize,
    pub background: Color,
    pub view: ViewBasis,
    /// Flat color standing in for the base imagery; `None` when hidden
    pub base: Option<Color>,
    pub data: Option<DataOverlay<'a>>,
    pub graticule: Option<GraticuleOverlay<'a>>,
}

/// Render a preview as RGBA pixels (4 bytes per pixel, row-major).
pub fn render_preview(request: &PreviewRequest<'_>) -> Vec<u8> {
    let (width, height) = (request.width, request.height);
    let mut pixels = vec![0u8; width * height * 4];
    if width == 0 || height == 0 {
        return pixels;
    }

    let view = &request.view;
    let right = normalize(cross(view.forward, view.up));
    let up = normalize(cross(right, view.forward));
    let toward_eye = [-view.forward[0], -view.forward[1], -view.forward[2]];

    let radius_px = DISC_FILL * width.min(height) as f64 / 2.0;
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    // Pixel footprint in degrees at the disc center, used for line width
    let deg_per_px = (1.0 / radius_px).to_degrees();

    pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(py, row)| {
            for px in 0..width {
                let u = (px as f64 + 0.5 - cx) / radius_px;
                let v = (cy - (py as f64 + 0.5)) / radius_px;
                let rr = u * u + v * v;

                let color = if rr > 1.0 {
                    request.background
                } else {
                    let w = (1.0 - rr).sqrt();
                    let p = [
                        u * right[0] + v * up[0] + w * toward_eye[0],
                        u * right[1] + v * up[1] + w * toward_eye[1],
                        u * right[2] + v * up[2] + w * toward_eye[2],
                    ];
                    let (lon, lat) = xyz_to_lonlat(p);
                    shade(request, lon, lat, deg_per_px)
                };

                row[px * 4..px * 4 + 4].copy_from_slice(&color.to_array());
            }
        });

    pixels
}

fn shade(request: &PreviewRequest<'_>, lon: f64, lat: f64, deg_per_px: f64) -> Color {
    let mut color = request.background;

    if let Some(base) = request.base {
        color = over(base, color);
    }

    if let Some(data) = &request.data {
        if let Some(value) = sample_nearest(data.grid, lon, lat) {
            color = over(data.colormap.color_for(Some(value as f64)), color);
        }
    }

    if let Some(overlay) = &request.graticule {
        let half_width = (overlay.style.line_width as f64 * deg_per_px / 2.0).max(deg_per_px / 2.0);
        if overlay.graticule.distance_deg(lon, lat) <= half_width {
            let stroke = overlay.style.color.with_opacity(overlay.style.opacity);
            color = over(stroke, color);
        }
    }

    color
}

/// Value of the grid node nearest to `(lon, lat)`, or `None` when the point
/// falls outside the grid or the node is masked.
pub fn sample_nearest(grid: &Grid, lon: f64, lat: f64) -> Option<f32> {
    let col = [lon, lon + 360.0, lon - 360.0]
        .into_iter()
        .find_map(|l| axis_index(grid.x(), l))?;
    let row = axis_index(grid.y(), lat)?;
    grid.values().get(row, col)
}

/// Nearest index on a regular axis, if `v` lies within half a step of it.
fn axis_index(axis: &[f64], v: f64) -> Option<usize> {
    let first = *axis.first()?;
    if axis.len() == 1 {
        return None;
    }
    let step = axis[1] - first;
    let idx = ((v - first) / step).round();
    if idx < 0.0 || idx >= axis.len() as f64 {
        return None;
    }
    Some(idx as usize)
}

/// Source-over compositing of `top` onto `bottom`.
fn over(top: Color, bottom: Color) -> Color {
    match top.a {
        0 => bottom,
        255 => top,
        _ => {
            let t = top.a as f64 / 255.0;
            let mix = |a: u8, b: u8| (a as f64 * t + b as f64 * (1.0 - t)).round() as u8;
            let a = (top.a as f64 + bottom.a as f64 * (1.0 - t)).round().min(255.0) as u8;
            Color::new(mix(top.r, bottom.r), mix(top.g, bottom.g), mix(top.b, bottom.b), a)
        }
    }
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: [f64; 3]) -> [f64; 3] {
    let n = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if n == 0.0 {
        return v;
    }
    [v[0] / n, v[1] / n, v[2] / n]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap;
    use globe_common::MaskedArray;

    const XZ_VIEW: ViewBasis = ViewBasis {
        forward: [0.0, 1.0, 0.0],
        up: [0.0, 0.0, 1.0],
    };

    fn pixel(pixels: &[u8], width: usize, x: usize, y: usize) -> [u8; 4] {
        let i = (y * width + x) * 4;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    }

    fn request<'a>() -> PreviewRequest<'a> {
        PreviewRequest {
            width: 40,
            height: 20,
            background: Color::rgb(14, 17, 23),
            view: XZ_VIEW,
            base: Some(Color::rgb(20, 60, 120)),
            data: None,
            graticule: None,
        }
    }

    #[test]
    fn test_corners_are_background() {
        let pixels = render_preview(&request());
        assert_eq!(pixels.len(), 40 * 20 * 4);
        assert_eq!(pixel(&pixels, 40, 0, 0), [14, 17, 23, 255]);
    }

    #[test]
    fn test_center_shows_base() {
        let pixels = render_preview(&request());
        assert_eq!(pixel(&pixels, 40, 20, 10), [20, 60, 120, 255]);
    }

    #[test]
    fn test_hidden_base_shows_background() {
        let req = PreviewRequest {
            base: None,
            ..request()
        };
        let pixels = render_preview(&req);
        assert_eq!(pixel(&pixels, 40, 20, 10), [14, 17, 23, 255]);
    }

    #[test]
    fn test_data_covers_view_center() {
        // The xz view looks at longitude -90 on the equator
        let x: Vec<f64> = (0..21).map(|i| -100.0 + i as f64).collect();
        let y: Vec<f64> = (0..21).map(|i| 10.0 - i as f64).collect();
        let values = MaskedArray::new(21, 21, vec![0.0; 441], vec![false; 441]).unwrap();
        let grid = Grid::new(x, y, values, "T").unwrap();
        let cmap = colormap::temperature();

        let req = PreviewRequest {
            data: Some(DataOverlay {
                grid: &grid,
                colormap: &cmap,
            }),
            ..request()
        };
        let pixels = render_preview(&req);
        assert_eq!(pixel(&pixels, 40, 20, 10), [221, 221, 221, 255]);
    }

    #[test]
    fn test_sample_nearest_wraps_longitude() {
        let x: Vec<f64> = (0..4).map(|i| 180.0 + i as f64).collect();
        let values = MaskedArray::new(2, 4, (0..8).map(|v| v as f32).collect(), vec![false; 8])
            .unwrap();
        let grid = Grid::new(x, vec![1.0, 0.0], values, "T").unwrap();
        assert_eq!(sample_nearest(&grid, -178.0, 0.0), Some(6.0));
        assert_eq!(sample_nearest(&grid, 0.0, 0.0), None);
        assert_eq!(sample_nearest(&grid, 181.0, 5.0), None);
    }

    #[test]
    fn test_over_blends_partial_alpha() {
        let c = over(Color::new(255, 0, 0, 102), Color::rgb(0, 0, 0));
        assert_eq!(c.r, 102);
        assert_eq!(c.a, 255);
    }
}
