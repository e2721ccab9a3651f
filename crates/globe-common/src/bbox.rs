//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees.
///
/// Rasters describe their extent as `(left, bottom, right, top)`; this maps to
/// `(min_x, min_y, max_x, max_y)` for north-up data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The whole globe in lon/lat degrees.
    pub fn global() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    pub fn left(&self) -> f64 {
        self.min_x
    }

    pub fn bottom(&self) -> f64 {
        self.min_y
    }

    pub fn right(&self) -> f64 {
        self.max_x
    }

    pub fn top(&self) -> f64 {
        self.max_y
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check that all corners are finite and the box is not inverted or empty.
    pub fn is_well_formed(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.max_x > self.min_x
            && self.max_y > self.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed() {
        assert!(BoundingBox::global().is_well_formed());
        assert!(!BoundingBox::new(10.0, 0.0, 5.0, 1.0).is_well_formed());
        assert!(!BoundingBox::new(0.0, 0.0, f64::NAN, 1.0).is_well_formed());
        assert!(!BoundingBox::new(0.0, 0.0, 0.0, 1.0).is_well_formed());
    }
}
