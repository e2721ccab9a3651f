//! Text assets (stylesheet, informational fragment) read on first use.

use globe_common::{GlobeError, GlobeResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::resource_cache::{CacheStats, ResourceCache};

/// Serves named text files from a directory, caching each after its first read.
pub struct AssetStore {
    root: PathBuf,
    cache: ResourceCache<String, String>,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: ResourceCache::new("assets"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read `name` relative to the asset root.
    ///
    /// Names are plain file names; separators and parent references are rejected.
    pub async fn get(&self, name: &str) -> GlobeResult<Arc<String>> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(GlobeError::InvalidParameter {
                param: "asset".to_string(),
                message: format!("'{}' is not a plain asset name", name),
            });
        }

        let path = self.root.join(name);
        self.cache
            .get_or_try_build(name.to_string(), || async move {
                let text = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| GlobeError::AssetError(format!("{}: {}", path.display(), e)))?;
                info!(path = %path.display(), bytes = text.len(), "Loaded asset");
                Ok(text)
            })
            .await
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}
