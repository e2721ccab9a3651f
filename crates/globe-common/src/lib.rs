//! Common types and utilities shared across the globe viewer crates.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod style;

pub use bbox::BoundingBox;
pub use error::{GlobeError, GlobeResult};
pub use grid::{build_axis, Grid, MaskedArray, Resolution};
pub use style::{Color, ColorStop, GradientConfig, LineStyle, OutOfRangeBehavior, TextStyle};
