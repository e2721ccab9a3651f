//! Grid loading for the globe viewer.
//!
//! Reads band 1 of a georeferenced raster, builds coordinate axes whose
//! lengths always match the band dimensions, masks no-data samples, and
//! memoizes the resulting [`Grid`](globe_common::Grid) per source for the
//! lifetime of the process.

pub mod config;
pub mod loader;

pub use config::{LoaderConfig, NodataConfig, NodataMode};
pub use loader::{grid_from_raster, GridLoader, GridSource, EQUATOR_DISTANCE_LABEL};
