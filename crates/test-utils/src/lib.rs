//! Shared test utilities for the globe viewer workspace.
//!
//! This crate provides common testing infrastructure including:
//! - GeoTIFF fixture writers backed by temporary directories
//! - Grid data generators
//! - Common test fixtures
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_axis_steps, GeoTiffFixture};
//! ```

pub mod fixtures;
pub mod generators;
pub mod geotiff;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use geotiff::*;

/// Assert that a coordinate axis steps evenly from `start` by `step`.
///
/// Every entry `i` must lie within `tol` of `start + i * step`; the
/// panic message names the first index that does not.
///
/// ```ignore
/// use test_utils::assert_axis_steps;
///
/// assert_axis_steps!(grid.x(), -130.0, 0.125, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_axis_steps {
    ($axis:expr, $start:expr, $step:expr, $tol:expr) => {{
        let axis: &[f64] = &$axis[..];
        let (start, step, tol): (f64, f64, f64) = ($start, $step, $tol);
        for (i, &value) in axis.iter().enumerate() {
            let expected = start + i as f64 * step;
            if !((value - expected).abs() <= tol) {
                panic!(
                    "axis entry {} is {}, expected {} (step {} from {}, tolerance {})",
                    i, value, expected, step, start, tol
                );
            }
        }
    }};
}
