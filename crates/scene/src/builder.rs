//! Scene construction with process-wide memoization by scene key.

use std::sync::Arc;
use std::time::Instant;

use globe_common::{Color, GlobeError, GlobeResult, GradientConfig, Grid, LineStyle, TextStyle};
use metrics::histogram;
use renderer::graticule::DEFAULT_STEP_DEG;
use renderer::{colormap, Graticule, SurfaceMesh, DATA_RADIUS, OVERLAY_RADIUS};
use serde::{Deserialize, Serialize};
use storage::{CacheStats, ResourceCache};
use tracing::{info, instrument};

use crate::camera::Camera;
use crate::scene::{
    Anchor, Annotation, Layer, LayerKind, Panel, Scene, BASE_LAYER, COASTLINES_LAYER, DATA_LAYER,
    GRATICULE_LAYER,
};

/// Most panels a scene can hold.
pub const MAX_PANELS: usize = 2;

/// Fixed presentation settings applied to every panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneStyle {
    pub window_size: (u32, u32),
    pub background: Color,
    pub base_texture: String,
    pub graticule: LineStyle,
    pub graticule_step_deg: f64,
    pub coastlines: LineStyle,
    pub coastline_resolution: String,
    pub annotation: TextStyle,
    /// Color scale limits for the data layer
    pub color_range: (f64, f64),
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            window_size: (800, 500),
            background: Color::rgb(0x0e, 0x11, 0x17),
            base_texture: "blue_marble".to_string(),
            graticule: LineStyle::new(Color::rgb(255, 192, 203), 0.4, 1.0),
            graticule_step_deg: DEFAULT_STEP_DEG,
            coastlines: LineStyle::new(Color::WHITE, 1.0, 8.0),
            coastline_resolution: "50m".to_string(),
            annotation: TextStyle {
                color: Color::WHITE,
                font_size: 16,
                shadow: true,
            },
            color_range: colormap::TEMPERATURE_RANGE,
        }
    }
}

/// Builds scenes from grids, at most once per scene key.
pub struct SceneBuilder {
    style: SceneStyle,
    cache: ResourceCache<String, Scene>,
}

impl SceneBuilder {
    pub fn new(style: SceneStyle) -> Self {
        Self {
            style,
            cache: ResourceCache::new("scene"),
        }
    }

    pub fn style(&self) -> &SceneStyle {
        &self.style
    }

    /// Build (or fetch) the scene for `key` with the default color range.
    pub async fn build_scene(
        &self,
        key: &str,
        grids: &[Arc<Grid>],
        labels: &[String],
    ) -> GlobeResult<Arc<Scene>> {
        let (lo, hi) = self.style.color_range;
        self.build_scene_with(key, grids, labels, colormap::coolwarm(lo, hi))
            .await
    }

    /// Build (or fetch) the scene for `key`.
    ///
    /// One panel is built per grid, labeled by the matching entry of
    /// `labels`. Once a key is built, later calls return the same scene and
    /// ignore their arguments.
    #[instrument(skip(self, grids, labels, colormap), fields(panels = grids.len()))]
    pub async fn build_scene_with(
        &self,
        key: &str,
        grids: &[Arc<Grid>],
        labels: &[String],
        colormap: GradientConfig,
    ) -> GlobeResult<Arc<Scene>> {
        let style = self.style.clone();
        let owned_key = key.to_string();
        let grids = grids.to_vec();
        let labels = labels.to_vec();

        self.cache
            .get_or_try_build(key.to_string(), || async move {
                let start = Instant::now();
                let scene = tokio::task::spawn_blocking(move || {
                    compose_scene(&owned_key, &grids, &labels, &style, &colormap)
                })
                .await
                .map_err(|e| GlobeError::InternalError(format!("scene build task failed: {}", e)))??;

                let elapsed = start.elapsed();
                histogram!("globe_scene_build_seconds").record(elapsed.as_secs_f64());
                info!(
                    scene = %scene.key(),
                    panels = scene.panels().len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Scene built"
                );
                Ok(scene)
            })
            .await
    }

    /// Scene keys that have been built.
    pub async fn built_keys(&self) -> Vec<String> {
        self.cache.keys().await
    }

    /// Fetch a built scene without building.
    pub async fn get(&self, key: &str) -> Option<Arc<Scene>> {
        self.cache.get(&key.to_string()).await
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}

/// Assemble a scene: one panel per grid, all sharing one camera.
pub fn compose_scene(
    key: &str,
    grids: &[Arc<Grid>],
    labels: &[String],
    style: &SceneStyle,
    colormap: &GradientConfig,
) -> GlobeResult<Scene> {
    validate_panels(grids, labels)?;
    colormap
        .validate()
        .map_err(|e| GlobeError::ConfigError(format!("color scale: {}", e)))?;

    let camera = Camera::xz().shared();
    let graticule = Graticule::new(style.graticule_step_deg, OVERLAY_RADIUS);

    let mut scene = Scene::new(key, style.window_size, style.background);
    for (index, (grid, label)) in grids.iter().zip(labels).enumerate() {
        let mut panel = Panel::new(index, camera.clone());

        panel.add_layer(Layer::new(
            BASE_LAYER,
            LayerKind::Base {
                texture: style.base_texture.clone(),
            },
        ));
        panel.add_layer(Layer::new(
            GRATICULE_LAYER,
            LayerKind::Graticule {
                style: style.graticule,
                graticule: graticule.clone(),
            },
        ));
        panel.add_layer(Layer::new(
            COASTLINES_LAYER,
            LayerKind::Coastlines {
                style: style.coastlines,
                resolution: style.coastline_resolution.clone(),
            },
        ));

        let mesh = SurfaceMesh::from_grid(grid, colormap, DATA_RADIUS)?;
        panel.add_layer(Layer::new(
            DATA_LAYER,
            LayerKind::Data {
                grid: grid.clone(),
                mesh,
                colormap: colormap.clone(),
            },
        ));

        panel.add_annotation(Annotation {
            text: label.clone(),
            anchor: Anchor::UpperLeft,
            style: style.annotation,
        });

        scene.push_panel(panel);
    }

    Ok(scene)
}

fn validate_panels(grids: &[Arc<Grid>], labels: &[String]) -> GlobeResult<()> {
    if grids.is_empty() || grids.len() > MAX_PANELS {
        return Err(GlobeError::ConfigError(format!(
            "a scene takes 1 to {} grids, got {}",
            MAX_PANELS,
            grids.len()
        )));
    }
    if labels.len() != grids.len() {
        return Err(GlobeError::ConfigError(format!(
            "{} labels given for {} panels",
            labels.len(),
            grids.len()
        )));
    }

    let expected = grids[0].shape();
    if let Some(other) = grids.iter().map(|g| g.shape()).find(|s| *s != expected) {
        return Err(GlobeError::ShapeMismatch {
            expected,
            actual: other,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use globe_common::MaskedArray;

    fn grid(rows: usize, cols: usize) -> Arc<Grid> {
        let x = (0..cols).map(|c| -120.0 + c as f64).collect();
        let y = (0..rows).map(|r| 50.0 - r as f64).collect();
        let values = MaskedArray::new(rows, cols, vec![1.0; rows * cols], vec![false; rows * cols])
            .unwrap();
        Arc::new(Grid::new(x, y, values, "T").unwrap())
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_style() {
        let style = SceneStyle::default();
        assert_eq!(style.window_size, (800, 500));
        assert_eq!(style.background.to_string(), "#0e1117ff");
        assert_eq!(style.color_range, (-20.0, 20.0));
        assert_eq!(style.coastline_resolution, "50m");
    }

    #[test]
    fn test_single_panel_layers() {
        let scene = compose_scene(
            "one",
            &[grid(3, 3)],
            &labels(&["Only"]),
            &SceneStyle::default(),
            &colormap::temperature(),
        )
        .unwrap();

        assert_eq!(scene.layout(), (1, 1));
        let names: Vec<&str> = scene.panels()[0].layers().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec![BASE_LAYER, GRATICULE_LAYER, COASTLINES_LAYER, DATA_LAYER]);
    }

    #[test]
    fn test_label_count_must_match() {
        let err = compose_scene(
            "k",
            &[grid(3, 3), grid(3, 3)],
            &labels(&["Minimum"]),
            &SceneStyle::default(),
            &colormap::temperature(),
        )
        .unwrap_err();
        assert!(matches!(err, GlobeError::ConfigError(_)));
    }

    #[test]
    fn test_panel_count_limits() {
        let style = SceneStyle::default();
        let cmap = colormap::temperature();
        assert!(compose_scene("k", &[], &[], &style, &cmap).is_err());

        let three = [grid(2, 2), grid(2, 2), grid(2, 2)];
        let err = compose_scene("k", &three, &labels(&["a", "b", "c"]), &style, &cmap).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_invalid_color_range() {
        let err = compose_scene(
            "k",
            &[grid(2, 2)],
            &labels(&["a"]),
            &SceneStyle::default(),
            &colormap::coolwarm(5.0, 5.0),
        )
        .unwrap_err();
        assert!(matches!(err, GlobeError::ConfigError(_)));
    }
}
