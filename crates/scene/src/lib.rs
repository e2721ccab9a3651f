//! Globe scene composition.
//!
//! A scene holds one panel per grid. Every panel carries the same fixed set of
//! layers (base imagery, graticule, coastlines and the data surface) plus a
//! text label, and multi-panel scenes share a single camera so the views move
//! together. Built scenes are memoized by scene key for the process lifetime.

pub mod builder;
pub mod camera;
pub mod scene;

pub use builder::{compose_scene, SceneBuilder, SceneStyle, MAX_PANELS};
pub use camera::{Camera, SharedCamera};
pub use scene::{
    Anchor, Annotation, Layer, LayerKind, Panel, Scene, SceneSnapshot, BASE_LAYER,
    COASTLINES_LAYER, DATA_LAYER, GRATICULE_LAYER,
};
