//! Service-level metrics.
//!
//! Cache and build metrics are recorded by the core crates; this module adds
//! the request counters and a JSON summary of both caches.

use metrics::counter;
use serde::Serialize;
use storage::CacheStats;

pub const RENDER_REQUESTS: &str = "globe_render_requests_total";
pub const SESSIONS_CREATED: &str = "globe_sessions_created_total";
pub const LAYER_TOGGLES: &str = "globe_layer_toggles_total";
pub const PREVIEWS_RENDERED: &str = "globe_previews_rendered_total";
pub const SESSIONS_REMOVED: &str = "globe_sessions_removed_total";

pub fn record_render_request(scene: &str, reused: bool) {
    counter!(
        RENDER_REQUESTS,
        "scene" => scene.to_string(),
        "reused" => reused.to_string()
    )
    .increment(1);
}

pub fn record_session_created(embedded: bool) {
    counter!(SESSIONS_CREATED, "embedded" => embedded.to_string()).increment(1);
}

pub fn record_sessions_removed(reason: &'static str, count: usize) {
    if count > 0 {
        counter!(SESSIONS_REMOVED, "reason" => reason).increment(count as u64);
    }
}

pub fn record_layer_toggle(layer: &str) {
    counter!(LAYER_TOGGLES, "layer" => layer.to_string()).increment(1);
}

pub fn record_preview() {
    counter!(PREVIEWS_RENDERED).increment(1);
}

/// Hit/miss/build counts of every process-wide cache.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    pub grids: CacheEntry,
    pub scenes: CacheEntry,
    pub assets: CacheEntry,
    pub grid_keys: Vec<String>,
    pub scene_keys: Vec<String>,
    pub sessions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheEntry {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self { stats, hit_rate }
    }
}
