//! Process-wide caches for the globe viewer.
//!
//! Provides:
//! - A generic memoizing cache with per-key construction
//! - A text asset store built on it

pub mod asset_store;
pub mod resource_cache;

pub use asset_store::AssetStore;
pub use resource_cache::{CacheStats, ResourceCache};
