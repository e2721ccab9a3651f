//! Scene handlers: render requests, layer toggles, camera moves, previews.

use axum::{
    extract::{Extension, Path},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use globe_common::{GlobeError, GlobeResult};
use scene::{Camera, Scene};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

use super::ApiResult;
use crate::metrics;
use crate::pipeline::build_configured_scene;
use crate::render_request::{RenderRequest, RenderResponse, RenderStage, StageReport};
use crate::state::AppState;

async fn built_scene(state: &AppState, key: &str) -> GlobeResult<Arc<Scene>> {
    state
        .scenes
        .get(key)
        .await
        .ok_or_else(|| GlobeError::SceneNotFound(key.to_string()))
}

// ============================================================================
// Render
// ============================================================================

/// POST /api/sessions/:id/scenes/:key/render - Build the scene and return the render request
#[instrument(skip(state))]
pub async fn render_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((id, key)): Path<(Uuid, String)>,
) -> ApiResult<Json<RenderResponse>> {
    state.sessions.get(id).await?;
    let start = Instant::now();
    let mut stages = Vec::with_capacity(3);

    let scene = build_configured_scene(&state, &key).await?;
    stages.push(StageReport::new(RenderStage::Building, start.elapsed().as_millis() as u64));

    let request = RenderRequest::for_scene(&scene);
    stages.push(StageReport::new(RenderStage::Sending, start.elapsed().as_millis() as u64));

    let already_rendered = state.sessions.mark_rendered(id, &key).await?;
    stages.push(StageReport::new(RenderStage::Ready, start.elapsed().as_millis() as u64));

    metrics::record_render_request(&key, already_rendered);
    info!(
        session = %id,
        scene = %key,
        panels = request.scene.panels.len(),
        already_rendered,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Render request prepared"
    );

    Ok(Json(RenderResponse {
        session_id: id.to_string(),
        scene_key: key,
        already_rendered,
        stages,
        request,
    }))
}

// ============================================================================
// Layer Visibility
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VisibilityBody {
    pub visible: bool,
}

#[derive(Debug, Serialize)]
pub struct VisibilityChange {
    pub scene: String,
    pub panel: usize,
    pub layer: String,
    pub previous: bool,
    pub visible: bool,
}

/// PUT /api/scenes/:key/panels/:panel/layers/:name/visibility - Show or hide a layer
#[instrument(skip(state))]
pub async fn visibility_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((key, panel, name)): Path<(String, usize, String)>,
    Json(body): Json<VisibilityBody>,
) -> ApiResult<Json<VisibilityChange>> {
    let scene = built_scene(&state, &key).await?;
    let previous = scene.set_layer_visibility(panel, &name, body.visible)?;
    metrics::record_layer_toggle(&name);

    Ok(Json(VisibilityChange {
        scene: key,
        panel,
        layer: name,
        previous,
        visible: body.visible,
    }))
}

// ============================================================================
// Camera
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OrbitBody {
    pub azimuth_deg: f64,
}

#[derive(Debug, Serialize)]
pub struct CameraMoved {
    pub scene: String,
    pub panel: usize,
    pub camera: Camera,
    /// Panels whose view moved with this one, including itself
    pub moved_panels: Vec<usize>,
}

/// POST /api/scenes/:key/panels/:panel/camera/orbit - Rotate a panel camera about the polar axis
#[instrument(skip(state))]
pub async fn orbit_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((key, panel)): Path<(String, usize)>,
    Json(body): Json<OrbitBody>,
) -> ApiResult<Json<CameraMoved>> {
    if !body.azimuth_deg.is_finite() {
        return Err(GlobeError::InvalidParameter {
            param: "azimuth_deg".to_string(),
            message: "must be a finite number".to_string(),
        }
        .into());
    }

    let scene = built_scene(&state, &key).await?;
    let camera = scene.orbit_camera(panel, body.azimuth_deg)?;

    let moved = scene.panel(panel)?;
    let moved_panels = scene
        .panels()
        .iter()
        .filter(|p| p.shares_camera_with(moved))
        .map(|p| p.index())
        .collect();

    Ok(Json(CameraMoved {
        scene: key,
        panel,
        camera,
        moved_panels,
    }))
}

// ============================================================================
// Preview
// ============================================================================

/// GET /api/scenes/:key/panels/:panel/preview.png - Software-rendered view of a panel
#[instrument(skip(state))]
pub async fn preview_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((key, panel)): Path<(String, usize)>,
) -> ApiResult<impl IntoResponse> {
    let scene = built_scene(&state, &key).await?;
    scene.panel(panel)?;

    let png = tokio::task::spawn_blocking(move || scene.render_panel_png(panel))
        .await
        .map_err(|e| GlobeError::InternalError(format!("preview task failed: {}", e)))??;
    metrics::record_preview();

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        Bytes::from(png),
    ))
}
