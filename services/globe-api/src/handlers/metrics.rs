//! Health check and metrics handlers.

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::instrument;

use crate::metrics::CacheReport;
use crate::state::AppState;

// ============================================================================
// Health Checks
// ============================================================================

/// GET /health - Basic health check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /ready - Readiness check
///
/// Ready once the default scene is configured; rasters are read lazily so
/// they are not checked here.
#[instrument(skip(state))]
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    if state.config.scene(&state.config.default_scene).is_some() {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Default scene not configured")
    }
}

// ============================================================================
// Prometheus Metrics
// ============================================================================

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}

// ============================================================================
// Cache Stats
// ============================================================================

/// GET /api/cache/stats - Grid, scene and asset cache statistics
#[instrument(skip(state))]
pub async fn cache_stats_handler(Extension(state): Extension<Arc<AppState>>) -> Json<CacheReport> {
    let mut grid_keys = state.grids.loaded_keys().await;
    grid_keys.sort();
    let mut scene_keys = state.scenes.built_keys().await;
    scene_keys.sort();

    Json(CacheReport {
        grids: state.grids.cache_stats().await.into(),
        scenes: state.scenes.cache_stats().await.into(),
        assets: state.assets.stats().await.into(),
        grid_keys,
        scene_keys,
        sessions: state.sessions.len().await,
    })
}
