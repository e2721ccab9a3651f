//! Session creation and page layout.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use globe_common::GlobeError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::assets::INFO_FRAGMENT;
use super::ApiResult;
use crate::metrics;
use crate::state::AppState;

pub const PAGE_TITLE: &str = "Globe viewer";
pub const STYLESHEET_URL: &str = "/assets/style.css";
pub const FULLSCREEN_HINT: &str = "Launch fullscreen to explore";
pub const LOAD_LABEL: &str = "Click here to load";
pub const LOAD_HELP: &str = "This might take a while depending on your device";

/// Relative widths of the info column and the panel area.
pub const COLUMN_WEIGHTS: [f32; 2] = [0.5, 2.0];

#[derive(Debug, Deserialize)]
pub struct SessionParams {
    #[serde(default)]
    pub embed: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub embedded: bool,
    pub page: String,
}

/// POST /api/sessions?embed=true|false - Start a session
#[instrument(skip(state))]
pub async fn create_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<SessionParams>,
) -> impl IntoResponse {
    let session = state.sessions.create(params.embed).await;
    metrics::record_session_created(session.embedded);
    info!(session = %session.id, embedded = session.embedded, "Session created");

    (
        StatusCode::CREATED,
        Json(SessionCreated {
            session_id: session.id,
            embedded: session.embedded,
            page: format!("/api/sessions/{}/page", session.id),
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub scene: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Page {
    pub session_id: Uuid,
    pub title: &'static str,
    pub stylesheet: &'static str,
    /// Display advisory, present on the first page view of a session only
    pub advisory: Option<&'static str>,
    pub layout: PageLayout,
}

#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PageLayout {
    /// Inside another page: info only, with a hint to open fullscreen
    Embedded { message: &'static str, info: String },
    Full {
        columns: [f32; 2],
        info: String,
        panel: PanelArea,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelArea {
    LoadTrigger {
        scene: String,
        label: &'static str,
        help: &'static str,
        action: String,
    },
    Rendered {
        scene: String,
        status: &'static str,
        action: String,
    },
}

/// GET /api/sessions/:id/page - Page layout for a session
#[instrument(skip(state))]
pub async fn page_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page>> {
    let session = state.sessions.get(id).await?;

    let key = params
        .scene
        .unwrap_or_else(|| state.config.default_scene.clone());
    if state.config.scene(&key).is_none() {
        return Err(GlobeError::SceneNotFound(key).into());
    }

    let info = state.assets.get(INFO_FRAGMENT).await?.to_string();

    let advisory = if state.sessions.take_advisory(id).await? {
        state.display.advisory()
    } else {
        None
    };

    let layout = if session.embedded {
        PageLayout::Embedded {
            message: FULLSCREEN_HINT,
            info,
        }
    } else {
        let action = format!("/api/sessions/{}/scenes/{}/render", id, key);
        let panel = if session.has_rendered(&key) {
            PanelArea::Rendered {
                scene: key,
                status: crate::render_request::RenderStage::Ready.label(),
                action,
            }
        } else {
            PanelArea::LoadTrigger {
                scene: key,
                label: LOAD_LABEL,
                help: LOAD_HELP,
                action,
            }
        };
        PageLayout::Full {
            columns: COLUMN_WEIGHTS,
            info,
            panel,
        }
    };

    Ok(Json(Page {
        session_id: id,
        title: PAGE_TITLE,
        stylesheet: STYLESHEET_URL,
        advisory,
        layout,
    }))
}
