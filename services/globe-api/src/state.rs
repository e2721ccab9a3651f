//! Application state and shared resources.

use std::path::PathBuf;

use grid_loader::GridLoader;
use scene::SceneBuilder;
use storage::AssetStore;

use crate::config::AppConfig;
use crate::display::DisplayStatus;
use crate::session::SessionStore;

/// Shared application state.
pub struct AppState {
    pub config: AppConfig,
    pub grids: GridLoader,
    pub scenes: SceneBuilder,
    pub assets: AssetStore,
    pub sessions: SessionStore,
    pub display: DisplayStatus,
}

impl AppState {
    /// Build state from configuration; raster paths are resolved against
    /// `assets_dir`.
    pub fn new(mut config: AppConfig, assets_dir: impl Into<PathBuf>, display: DisplayStatus) -> Self {
        let assets_dir = assets_dir.into();
        config.resolve_paths(&assets_dir);

        Self {
            grids: GridLoader::new(config.loader.clone()),
            scenes: SceneBuilder::new(config.style.clone()),
            assets: AssetStore::new(assets_dir),
            sessions: SessionStore::with_config(config.sessions.clone()),
            display,
            config,
        }
    }
}
