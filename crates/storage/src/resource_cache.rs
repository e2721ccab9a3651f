//! Process-wide memoization of expensive, immutable resources.
//!
//! Each key owns a [`OnceCell`] so that concurrent first callers for the same
//! key wait on a single build instead of each paying for it. Entries are never
//! evicted or invalidated: the set of rasters and scenes served by a process is
//! fixed and small.
//!
//! # Cache Key Format
//! Keys are whatever identifies the resource, e.g.:
//! - "assets/tiff/us.tmin_nohads_ll_20231224_float.tif" (grids, by path)
//! - "planet" (scenes, by scene key)

use metrics::{counter, histogram};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, warn};

/// Statistics for a resource cache
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub builds: u64,
    pub failures: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

type Slot<V> = Arc<OnceCell<Arc<V>>>;

/// Concurrent key -> lazily built shared value map.
pub struct ResourceCache<K, V> {
    /// Name used in logs and metric labels
    name: &'static str,
    slots: RwLock<HashMap<K, Slot<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    failures: AtomicU64,
}

impl<K, V> ResourceCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            builds: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get a built value without triggering a build.
    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        let slots = self.slots.read().await;
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Get the value for `key`, building it with `build` on first use.
    ///
    /// Concurrent callers for the same key share one build. A failed build
    /// leaves the key empty, so a later call builds again.
    pub async fn get_or_try_build<F, Fut, E>(&self, key: K, build: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: std::fmt::Display,
    {
        let slot = self.slot(&key).await;

        if let Some(value) = slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            counter!("globe_cache_hits_total", "cache" => self.name).increment(1);
            return Ok(value.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("globe_cache_misses_total", "cache" => self.name).increment(1);

        let name = self.name;
        let (builds, failures) = (&self.builds, &self.failures);
        let key_ref = &key;
        let value = slot
            .get_or_try_init(move || async move {
                let start = Instant::now();
                debug!(cache = name, key = ?key_ref, "Building cache entry");

                match build().await {
                    Ok(value) => {
                        let elapsed = start.elapsed();
                        builds.fetch_add(1, Ordering::Relaxed);
                        counter!("globe_cache_builds_total", "cache" => name).increment(1);
                        histogram!("globe_cache_build_seconds", "cache" => name)
                            .record(elapsed.as_secs_f64());
                        debug!(
                            cache = name,
                            key = ?key_ref,
                            elapsed_ms = elapsed.as_millis() as u64,
                            "Cache entry built"
                        );
                        Ok(Arc::new(value))
                    }
                    Err(e) => {
                        failures.fetch_add(1, Ordering::Relaxed);
                        warn!(cache = name, key = ?key_ref, error = %e, "Cache entry build failed");
                        Err(e)
                    }
                }
            })
            .await?;

        Ok(value.clone())
    }

    /// Keys whose values have been built.
    pub async fn keys(&self) -> Vec<K> {
        let slots = self.slots.read().await;
        slots
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Number of built entries.
    pub async fn len(&self) -> usize {
        let slots = self.slots.read().await;
        slots.values().filter(|slot| slot.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Get current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            entries: self.len().await,
        }
    }

    async fn slot(&self, key: &K) -> Slot<V> {
        if let Some(slot) = self.slots.read().await.get(key) {
            return slot.clone();
        }
        let mut slots = self.slots.write().await;
        slots
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}
