//! Static page assets.

use axum::{extract::Extension, http::header, response::IntoResponse};
use std::sync::Arc;
use tracing::instrument;

use super::ApiResult;
use crate::state::AppState;

pub const STYLESHEET: &str = "style.css";
pub const INFO_FRAGMENT: &str = "info.html";

/// GET /assets/style.css - Page stylesheet
#[instrument(skip(state))]
pub async fn stylesheet_handler(Extension(state): Extension<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let css = state.assets.get(STYLESHEET).await?;
    Ok(([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css.to_string()))
}

/// GET /assets/info.html - Informational fragment
#[instrument(skip(state))]
pub async fn info_handler(Extension(state): Extension<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let html = state.assets.get(INFO_FRAGMENT).await?;
    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html.to_string()))
}
