//! Panel cameras.

use std::sync::{Arc, RwLock};

use renderer::ViewBasis;
use serde::{Deserialize, Serialize};

/// Distance from the globe center to the default camera position.
pub const DEFAULT_DISTANCE: f64 = 4.0;

/// A look-at camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: [f64; 3],
    pub focal_point: [f64; 3],
    pub view_up: [f64; 3],
}

/// A camera shared by every panel that holds a clone of the handle.
pub type SharedCamera = Arc<RwLock<Camera>>;

impl Camera {
    /// Looking along +Y from the -Y side at the origin, Z up.
    ///
    /// This faces longitude -90 on the equator, with X to the right.
    pub fn xz() -> Self {
        Self {
            position: [0.0, -DEFAULT_DISTANCE, 0.0],
            focal_point: [0.0, 0.0, 0.0],
            view_up: [0.0, 0.0, 1.0],
        }
    }

    pub fn shared(self) -> SharedCamera {
        Arc::new(RwLock::new(self))
    }

    /// Unit vector from the position to the focal point.
    pub fn direction(&self) -> [f64; 3] {
        normalize(sub(self.focal_point, self.position))
    }

    pub fn distance(&self) -> f64 {
        norm(sub(self.focal_point, self.position))
    }

    pub fn view_basis(&self) -> ViewBasis {
        ViewBasis {
            forward: self.direction(),
            up: normalize(self.view_up),
        }
    }

    /// Rotate the camera about the world Z axis through the focal point.
    pub fn orbit(&mut self, azimuth_deg: f64) {
        let (s, c) = azimuth_deg.to_radians().sin_cos();
        let rotate = |v: [f64; 3]| [c * v[0] - s * v[1], s * v[0] + c * v[1], v[2]];

        let offset = sub(self.position, self.focal_point);
        let moved = rotate(offset);
        self.position = [
            self.focal_point[0] + moved[0],
            self.focal_point[1] + moved[1],
            self.focal_point[2] + moved[2],
        ];
        self.view_up = rotate(self.view_up);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::xz()
    }
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn normalize(v: [f64; 3]) -> [f64; 3] {
    let n = norm(v);
    if n == 0.0 {
        return v;
    }
    [v[0] / n, v[1] / n, v[2] / n]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn test_xz_view() {
        let cam = Camera::xz();
        assert!(close(cam.direction(), [0.0, 1.0, 0.0]));
        assert_eq!(cam.distance(), DEFAULT_DISTANCE);
        assert_eq!(cam.view_basis().up, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_orbit_quarter_turn() {
        let mut cam = Camera::xz();
        cam.orbit(90.0);
        assert!(close(cam.position, [DEFAULT_DISTANCE, 0.0, 0.0]));
        assert!(close(cam.view_up, [0.0, 0.0, 1.0]));
        assert!((cam.distance() - DEFAULT_DISTANCE).abs() < 1e-9);
    }

    #[test]
    fn test_full_orbit_returns_home() {
        let mut cam = Camera::xz();
        for _ in 0..4 {
            cam.orbit(90.0);
        }
        assert!(close(cam.position, Camera::xz().position));
    }
}
