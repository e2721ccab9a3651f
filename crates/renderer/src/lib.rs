//! Geometry and image rendering for the globe viewer.
//!
//! Implements:
//! - The diverging color scale used for the data layer
//! - Sampling lon/lat grids onto the sphere as colored quad meshes
//! - Graticule line overlays
//! - Orthographic previews encoded as PNG

pub mod colormap;
pub mod graticule;
pub mod mesh;
pub mod png;
pub mod preview;

pub use graticule::Graticule;
pub use mesh::{lonlat_to_xyz, SurfaceMesh, BASE_RADIUS, DATA_RADIUS, OVERLAY_RADIUS};
pub use preview::{render_preview, DataOverlay, GraticuleOverlay, PreviewRequest, ViewBasis};
