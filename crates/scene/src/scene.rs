//! Composed globe scenes: panels, layers, annotations and cameras.
//!
//! A [`Scene`] is immutable once built except for two things: each layer's
//! visibility flag and the (possibly shared) panel cameras. Both can change
//! through `&Scene`, so one `Arc<Scene>` serves every consumer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use globe_common::{Color, GlobeError, GlobeResult, GradientConfig, Grid, LineStyle, TextStyle};
use renderer::png::create_png_auto;
use renderer::{
    render_preview, DataOverlay, Graticule, GraticuleOverlay, PreviewRequest, SurfaceMesh,
};
use serde::Serialize;
use tracing::debug;

use crate::camera::{Camera, SharedCamera};

pub const BASE_LAYER: &str = "base";
pub const GRATICULE_LAYER: &str = "graticule";
pub const COASTLINES_LAYER: &str = "coastlines";
pub const DATA_LAYER: &str = "data";

/// Flat color drawn for the base imagery in previews.
pub const BASE_PREVIEW_COLOR: Color = Color::rgb(22, 54, 102);

/// What a layer draws.
#[derive(Debug)]
pub enum LayerKind {
    /// Planetary texture resource wrapped around the sphere
    Base { texture: String },
    Graticule { style: LineStyle, graticule: Graticule },
    /// Coastline geometry at a Natural Earth resolution ("10m", "50m", "110m")
    Coastlines { style: LineStyle, resolution: String },
    /// The grid as a colored surface
    Data {
        grid: Arc<Grid>,
        mesh: SurfaceMesh,
        colormap: GradientConfig,
    },
}

impl LayerKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            LayerKind::Base { .. } => "base",
            LayerKind::Graticule { .. } => "graticule",
            LayerKind::Coastlines { .. } => "coastlines",
            LayerKind::Data { .. } => "data",
        }
    }
}

/// A named layer with a visibility flag.
#[derive(Debug)]
pub struct Layer {
    name: String,
    kind: LayerKind,
    visible: AtomicBool,
}

impl Layer {
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            visible: AtomicBool::new(true),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &LayerKind {
        &self.kind
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    /// Set the flag, returning its previous value.
    pub fn set_visible(&self, visible: bool) -> bool {
        self.visible.swap(visible, Ordering::AcqRel)
    }
}

/// Where a text annotation is anchored within its panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub anchor: Anchor,
    pub style: TextStyle,
}

/// One sub-view of a scene.
#[derive(Debug)]
pub struct Panel {
    index: usize,
    layers: Vec<Layer>,
    annotations: Vec<Annotation>,
    camera: SharedCamera,
}

impl Panel {
    pub fn new(index: usize, camera: SharedCamera) -> Self {
        Self {
            index,
            layers: Vec::new(),
            annotations: Vec::new(),
            camera,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Add a layer; a layer with the same name is replaced in place.
    pub fn add_layer(&mut self, layer: Layer) {
        match self.layers.iter_mut().find(|l| l.name == layer.name) {
            Some(existing) => {
                debug!(panel = self.index, layer = %layer.name, "Replacing layer");
                *existing = layer;
            }
            None => self.layers.push(layer),
        }
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Current camera state.
    pub fn camera(&self) -> Camera {
        *self.camera.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn camera_handle(&self) -> &SharedCamera {
        &self.camera
    }

    /// Whether this panel and `other` move the same camera.
    pub fn shares_camera_with(&self, other: &Panel) -> bool {
        Arc::ptr_eq(&self.camera, &other.camera)
    }

    /// Apply `f` to the camera and return the new state.
    pub fn update_camera<F>(&self, f: F) -> Camera
    where
        F: FnOnce(&mut Camera),
    {
        let mut camera = self.camera.write().unwrap_or_else(|e| e.into_inner());
        f(&mut *camera);
        *camera
    }

    fn visible_layer(&self, name: &str) -> Option<&LayerKind> {
        self.layer(name).filter(|l| l.is_visible()).map(|l| l.kind())
    }
}

/// A renderable composite of one or more panels.
#[derive(Debug)]
pub struct Scene {
    key: String,
    window_size: (u32, u32),
    background: Color,
    /// (rows, cols) of the panel layout
    layout: (usize, usize),
    panels: Vec<Panel>,
}

impl Scene {
    pub fn new(key: impl Into<String>, window_size: (u32, u32), background: Color) -> Self {
        Self {
            key: key.into(),
            window_size,
            background,
            layout: (1, 0),
            panels: Vec::new(),
        }
    }

    /// Append a panel to the single layout row.
    pub fn push_panel(&mut self, panel: Panel) {
        self.panels.push(panel);
        self.layout = (1, self.panels.len());
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn layout(&self) -> (usize, usize) {
        self.layout
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, index: usize) -> GlobeResult<&Panel> {
        self.panels.get(index).ok_or(GlobeError::PanelOutOfRange {
            panel: index,
            count: self.panels.len(),
        })
    }

    /// Whether every panel moves one shared camera.
    pub fn cameras_linked(&self) -> bool {
        match self.panels.split_first() {
            Some((first, rest)) => rest.iter().all(|p| p.shares_camera_with(first)),
            None => false,
        }
    }

    /// Flip one layer's visibility, returning the previous value.
    ///
    /// No geometry is rebuilt and no other layer is touched.
    pub fn set_layer_visibility(&self, panel: usize, name: &str, visible: bool) -> GlobeResult<bool> {
        let layer = self
            .panel(panel)?
            .layer(name)
            .ok_or_else(|| GlobeError::LayerNotFound {
                panel,
                layer: name.to_string(),
            })?;
        let previous = layer.set_visible(visible);
        debug!(scene = %self.key, panel, layer = name, visible, previous, "Layer visibility set");
        Ok(previous)
    }

    /// Orbit the camera of `panel` about the globe's polar axis.
    ///
    /// Linked panels follow, since they hold the same camera.
    pub fn orbit_camera(&self, panel: usize, azimuth_deg: f64) -> GlobeResult<Camera> {
        Ok(self.panel(panel)?.update_camera(|c| c.orbit(azimuth_deg)))
    }

    /// Pixel size of one panel: the window split evenly across the layout.
    pub fn panel_size(&self) -> (u32, u32) {
        let (rows, cols) = self.layout;
        let (w, h) = self.window_size;
        (w / cols.max(1) as u32, h / rows.max(1) as u32)
    }

    /// Orthographic preview of one panel as a PNG.
    ///
    /// Draws the visible base, data and graticule layers as seen by the
    /// panel's current camera. Coastlines and annotations are left to the
    /// interactive display.
    pub fn render_panel_png(&self, panel: usize) -> GlobeResult<Vec<u8>> {
        let p = self.panel(panel)?;
        let (width, height) = self.panel_size();

        let data = match p.visible_layer(DATA_LAYER) {
            Some(LayerKind::Data { grid, colormap, .. }) => Some(DataOverlay {
                grid: &**grid,
                colormap,
            }),
            _ => None,
        };
        let graticule = match p.visible_layer(GRATICULE_LAYER) {
            Some(LayerKind::Graticule { style, graticule }) => Some(GraticuleOverlay {
                graticule,
                style: *style,
            }),
            _ => None,
        };
        let base = p.visible_layer(BASE_LAYER).map(|_| BASE_PREVIEW_COLOR);

        let request = PreviewRequest {
            width: width as usize,
            height: height as usize,
            background: self.background,
            view: p.camera().view_basis(),
            base,
            data,
            graticule,
        };
        let pixels = render_preview(&request);
        create_png_auto(&pixels, request.width, request.height).map_err(GlobeError::RenderError)
    }

    /// Serializable view of the scene's current state.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            key: self.key.clone(),
            window_size: self.window_size,
            background: self.background,
            layout: self.layout,
            cameras_linked: self.cameras_linked(),
            panels: self
                .panels
                .iter()
                .map(|p| PanelSnapshot {
                    index: p.index,
                    layers: p
                        .layers
                        .iter()
                        .map(|l| LayerSnapshot {
                            name: l.name.clone(),
                            kind: l.kind.kind_name(),
                            visible: l.is_visible(),
                        })
                        .collect(),
                    annotations: p.annotations.clone(),
                    camera: p.camera(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerSnapshot {
    pub name: String,
    pub kind: &'static str,
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelSnapshot {
    pub index: usize,
    pub layers: Vec<LayerSnapshot>,
    pub annotations: Vec<Annotation>,
    pub camera: Camera,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneSnapshot {
    pub key: String,
    pub window_size: (u32, u32),
    pub background: Color,
    pub layout: (usize, usize),
    pub cameras_linked: bool,
    pub panels: Vec<PanelSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(texture: &str) -> Layer {
        Layer::new(
            BASE_LAYER,
            LayerKind::Base {
                texture: texture.to_string(),
            },
        )
    }

    #[test]
    fn test_add_layer_replaces_same_name() {
        let mut panel = Panel::new(0, Camera::xz().shared());
        panel.add_layer(base("first"));
        panel.add_layer(Layer::new(
            COASTLINES_LAYER,
            LayerKind::Coastlines {
                style: LineStyle::new(Color::WHITE, 1.0, 8.0),
                resolution: "50m".to_string(),
            },
        ));
        panel.add_layer(base("second"));

        assert_eq!(panel.layers().len(), 2);
        // Replacement keeps the original position
        assert_eq!(panel.layers()[0].name(), BASE_LAYER);
        match panel.layer(BASE_LAYER).map(|l| l.kind()) {
            Some(LayerKind::Base { texture }) => assert_eq!(texture, "second"),
            other => panic!("unexpected layer {:?}", other),
        }
    }

    #[test]
    fn test_visibility_toggle_returns_previous() {
        let mut panel = Panel::new(0, Camera::xz().shared());
        panel.add_layer(base("t"));
        let mut scene = Scene::new("k", (800, 500), Color::BLACK);
        scene.push_panel(panel);

        assert_eq!(scene.set_layer_visibility(0, BASE_LAYER, false).unwrap(), true);
        assert_eq!(scene.set_layer_visibility(0, BASE_LAYER, false).unwrap(), false);
        assert!(!scene.panel(0).unwrap().layer(BASE_LAYER).unwrap().is_visible());
    }

    #[test]
    fn test_unknown_panel_and_layer() {
        let mut scene = Scene::new("k", (800, 500), Color::BLACK);
        scene.push_panel(Panel::new(0, Camera::xz().shared()));

        assert!(matches!(
            scene.set_layer_visibility(3, BASE_LAYER, true),
            Err(GlobeError::PanelOutOfRange { panel: 3, count: 1 })
        ));
        assert!(matches!(
            scene.set_layer_visibility(0, "nope", true),
            Err(GlobeError::LayerNotFound { .. })
        ));
    }

    #[test]
    fn test_panel_size_splits_window() {
        let camera = Camera::xz().shared();
        let mut scene = Scene::new("k", (800, 500), Color::BLACK);
        scene.push_panel(Panel::new(0, camera.clone()));
        scene.push_panel(Panel::new(1, camera));
        assert_eq!(scene.layout(), (1, 2));
        assert_eq!(scene.panel_size(), (400, 500));
        assert!(scene.cameras_linked());
    }

    #[test]
    fn test_unlinked_cameras() {
        let mut scene = Scene::new("k", (800, 500), Color::BLACK);
        scene.push_panel(Panel::new(0, Camera::xz().shared()));
        scene.push_panel(Panel::new(1, Camera::xz().shared()));
        assert!(!scene.cameras_linked());

        scene.orbit_camera(0, 45.0).unwrap();
        assert_ne!(scene.panel(0).unwrap().camera(), scene.panel(1).unwrap().camera());
    }
}
