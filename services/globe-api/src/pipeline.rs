//! Load a configured scene's grids and build the scene.

use std::sync::Arc;

use globe_common::{GlobeError, GlobeResult, Grid};
use grid_loader::GridLoader;
use renderer::colormap;
use scene::Scene;
use tracing::{info, instrument, warn};

use crate::config::SceneConfig;
use crate::state::AppState;

/// Load every panel grid concurrently.
///
/// All outcomes are inspected: successful grids stay cached even when a
/// sibling fails, and the returned error names every failed source.
pub async fn load_panel_grids(loader: &GridLoader, config: &SceneConfig) -> GlobeResult<Vec<Arc<Grid>>> {
    let sources = config.sources();
    let outcomes = loader.load_all(&sources).await;

    let mut grids = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for (source, outcome) in sources.iter().zip(outcomes) {
        match outcome {
            Ok(grid) => {
                info!(source = %source.cache_key(), shape = ?grid.shape(), "Panel grid ready");
                grids.push(grid);
            }
            Err(e) => {
                warn!(source = %source.cache_key(), error = %e, "Panel grid failed");
                failures.push((source.cache_key(), e));
            }
        }
    }

    match failures.len() {
        0 => Ok(grids),
        1 => Err(failures.remove(0).1),
        _ => Err(GlobeError::DataReadError(
            failures
                .iter()
                .map(|(source, e)| format!("{}: {}", source, e))
                .collect::<Vec<_>>()
                .join("; "),
        )),
    }
}

/// Build (or fetch) the configured scene `key`.
///
/// An already built scene is returned without touching the grid loader.
#[instrument(skip(state))]
pub async fn build_configured_scene(state: &AppState, key: &str) -> GlobeResult<Arc<Scene>> {
    if let Some(scene) = state.scenes.get(key).await {
        return Ok(scene);
    }

    let config = state
        .config
        .scene(key)
        .ok_or_else(|| GlobeError::SceneNotFound(key.to_string()))?;

    let grids = load_panel_grids(&state.grids, config).await?;
    let (lo, hi) = config.color_range.unwrap_or(state.scenes.style().color_range);

    state
        .scenes
        .build_scene_with(key, &grids, &config.labels(), colormap::coolwarm(lo, hi))
        .await
}
