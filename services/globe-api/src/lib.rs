//! Globe viewer HTTP service library.
//!
//! Exposes the router and its modules so integration tests can drive the
//! service without binding a socket.

pub mod config;
pub mod display;
pub mod handlers;
pub mod metrics;
pub mod pipeline;
pub mod render_request;
pub mod session;
pub mod state;

use axum::{
    extract::Extension,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the application router.
pub fn build_router(state: Arc<AppState>, prometheus: PrometheusHandle) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        .route("/metrics", get(handlers::metrics_handler))
        // Sessions and page
        .route("/api/sessions", post(handlers::create_session_handler))
        .route("/api/sessions/:id/page", get(handlers::page_handler))
        .route(
            "/api/sessions/:id/scenes/:key/render",
            post(handlers::render_handler),
        )
        // Built scenes
        .route(
            "/api/scenes/:key/panels/:panel/layers/:name/visibility",
            put(handlers::visibility_handler),
        )
        .route(
            "/api/scenes/:key/panels/:panel/camera/orbit",
            post(handlers::orbit_handler),
        )
        .route(
            "/api/scenes/:key/panels/:panel/preview.png",
            get(handlers::preview_handler),
        )
        // Assets
        .route("/assets/style.css", get(handlers::stylesheet_handler))
        .route("/assets/info.html", get(handlers::info_handler))
        .route("/api/cache/stats", get(handlers::cache_stats_handler))
        .layer(Extension(state))
        .layer(Extension(prometheus))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
