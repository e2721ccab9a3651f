//! HTTP request handlers.
//!
//! This module is organized into submodules:
//! - `page`: session creation and page layout
//! - `scene`: render requests, layer visibility, camera moves and previews
//! - `assets`: stylesheet and info fragment
//! - `metrics`: health checks, Prometheus metrics and cache statistics

pub mod assets;
pub mod metrics;
pub mod page;
pub mod scene;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use globe_common::GlobeError;
use tracing::{error, warn};

pub use self::assets::{info_handler, stylesheet_handler};
pub use self::metrics::{cache_stats_handler, health_handler, metrics_handler, ready_handler};
pub use self::page::{create_session_handler, page_handler};
pub use self::scene::{orbit_handler, preview_handler, render_handler, visibility_handler};

/// Handler error carrying a [`GlobeError`] into a JSON response.
#[derive(Debug)]
pub struct ApiError(pub GlobeError);

impl From<GlobeError> for ApiError {
    fn from(err: GlobeError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_configuration_error() {
            error!(error = %self.0, "Configured scene cannot be served");
        } else if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(error = %self.0, "Request rejected");
        }

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let response = ApiError(GlobeError::ShapeMismatch {
            expected: (4, 4),
            actual: (3, 4),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ApiError(GlobeError::SceneNotFound("moon".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
