//! Service configuration.
//!
//! Loaded from a YAML file when one is given, otherwise built from defaults
//! that reproduce the min/max temperature scene and the synthetic equator
//! scene. Relative raster paths are resolved against the assets directory.

use anyhow::{Context, Result};
use grid_loader::{GridSource, LoaderConfig};
use raster_reader::synthetic;
use scene::SceneStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::session::SessionConfig;

/// Scene shown when a page request names none.
pub const DEFAULT_SCENE: &str = "planet";

pub const TMIN_TIFF: &str = "tiff/us.tmin_nohads_ll_20231224_float.tif";
pub const TMAX_TIFF: &str = "tiff/us.tmax_nohads_ll_20231224_float.tif";

/// One panel of a configured scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Text drawn in the panel's upper-left corner
    pub label: String,
    pub source: GridSource,
}

/// A scene the service can build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub key: String,
    pub panels: Vec<PanelConfig>,
    /// Color scale limits; the style's range when absent
    #[serde(default)]
    pub color_range: Option<(f64, f64)>,
}

impl SceneConfig {
    pub fn sources(&self) -> Vec<GridSource> {
        self.panels.iter().map(|p| p.source.clone()).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.panels.iter().map(|p| p.label.clone()).collect()
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub style: SceneStyle,

    #[serde(default = "default_scenes")]
    pub scenes: Vec<SceneConfig>,

    #[serde(default = "default_scene_key")]
    pub default_scene: String,

    #[serde(default)]
    pub sessions: SessionConfig,
}

fn default_scene_key() -> String {
    DEFAULT_SCENE.to_string()
}

fn default_scenes() -> Vec<SceneConfig> {
    vec![
        SceneConfig {
            key: "planet".to_string(),
            panels: vec![
                PanelConfig {
                    label: "🌎 Minimum".to_string(),
                    source: GridSource::geotiff(TMIN_TIFF),
                },
                PanelConfig {
                    label: "🌎 Maximum".to_string(),
                    source: GridSource::geotiff(TMAX_TIFF),
                },
            ],
            color_range: None,
        },
        SceneConfig {
            key: "equator".to_string(),
            panels: vec![PanelConfig {
                label: "🌎 Distance to equator".to_string(),
                source: GridSource::EquatorDistance {
                    resolution_deg: 1.0,
                },
            }],
            color_range: Some((0.0, 90.0)),
        },
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            style: SceneStyle::default(),
            scenes: default_scenes(),
            default_scene: default_scene_key(),
            sessions: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read the YAML file at `path`, or fall back to defaults with loader
    /// options taken from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                let config = Self::from_yaml(&contents)
                    .with_context(|| format!("parsing config {}", path.display()))?;
                info!(path = %path.display(), scenes = config.scenes.len(), "Loaded configuration");
                config
            }
            None => Self {
                loader: LoaderConfig::from_env(),
                ..Self::default()
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Reject configurations no scene could be built from.
    pub fn validate(&self) -> Result<()> {
        for (i, entry) in self.scenes.iter().enumerate() {
            if self.scenes[..i].iter().any(|s| s.key == entry.key) {
                anyhow::bail!("duplicate scene key '{}'", entry.key);
            }
            if entry.panels.is_empty() || entry.panels.len() > scene::MAX_PANELS {
                anyhow::bail!(
                    "scene '{}' has {} panels, expected 1 to {}",
                    entry.key,
                    entry.panels.len(),
                    scene::MAX_PANELS
                );
            }
            for panel in &entry.panels {
                if let GridSource::EquatorDistance { resolution_deg } = panel.source {
                    if !synthetic::is_valid_resolution(resolution_deg) {
                        anyhow::bail!(
                            "scene '{}' panel '{}': synthetic resolution {} must be in [{}, {}] degrees",
                            entry.key,
                            panel.label,
                            resolution_deg,
                            synthetic::MIN_RESOLUTION_DEG,
                            synthetic::MAX_RESOLUTION_DEG
                        );
                    }
                }
            }
        }
        if self.sessions.max_sessions == 0 {
            anyhow::bail!("sessions.max_sessions must be at least 1");
        }
        if self.scene(&self.default_scene).is_none() {
            anyhow::bail!("default scene '{}' is not configured", self.default_scene);
        }
        Ok(())
    }

    pub fn scene(&self, key: &str) -> Option<&SceneConfig> {
        self.scenes.iter().find(|s| s.key == key)
    }

    /// Make relative GeoTIFF paths relative to `assets_dir`.
    pub fn resolve_paths(&mut self, assets_dir: &Path) {
        for panel in self.scenes.iter_mut().flat_map(|s| s.panels.iter_mut()) {
            if let GridSource::GeoTiff { path } = &mut panel.source {
                if path.is_relative() {
                    *path = assets_dir.join(&*path);
                }
            }
        }
    }
}
