//! Per-visitor session flags.
//!
//! The core crates never read these; handlers pass them in as plain values.
//! Sessions idle longer than the configured TTL are dropped, and the store
//! never holds more than `max_sessions`.

use chrono::{DateTime, Duration, Utc};
use globe_common::{GlobeError, GlobeResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Session lifetime limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds without a request before a session expires
    pub idle_ttl_secs: u64,
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: 3600,
            max_sessions: 10_000,
        }
    }
}

impl SessionConfig {
    fn idle_ttl(&self) -> Duration {
        let secs = i64::try_from(self.idle_ttl_secs).unwrap_or(i64::MAX);
        Duration::seconds(secs.min(i64::MAX / 1000))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Page is shown inside another page's frame
    pub embedded: bool,
    /// Scene keys already rendered for this session
    pub rendered: BTreeSet<String>,
    pub advisory_shown: bool,
}

impl Session {
    fn new(embedded: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_seen: now,
            embedded,
            rendered: BTreeSet::new(),
            advisory_shown: false,
        }
    }

    pub fn has_rendered(&self, key: &str) -> bool {
        self.rendered.contains(key)
    }
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Start a session, first dropping expired ones and, at capacity, the
    /// least recently seen.
    pub async fn create(&self, embedded: bool) -> Session {
        let now = Utc::now();
        let session = Session::new(embedded, now);

        let mut sessions = self.sessions.write().await;
        let expired = self.prune_idle(&mut sessions, now);
        let evicted = self.evict_to_capacity(&mut sessions);
        if expired + evicted > 0 {
            record_sessions_removed(expired, evicted);
            debug!(expired, evicted, remaining = sessions.len(), "Pruned sessions");
        }

        sessions.insert(session.id, session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> GlobeResult<Session> {
        let mut sessions = self.sessions.write().await;
        self.touch(&mut sessions, id).cloned()
    }

    /// Record that `key` was rendered; returns whether it already was.
    pub async fn mark_rendered(&self, id: Uuid, key: &str) -> GlobeResult<bool> {
        let mut sessions = self.sessions.write().await;
        let session = self.touch(&mut sessions, id)?;
        Ok(!session.rendered.insert(key.to_string()))
    }

    /// True the first time it is called for a session, false afterwards.
    pub async fn take_advisory(&self, id: Uuid) -> GlobeResult<bool> {
        let mut sessions = self.sessions.write().await;
        let session = self.touch(&mut sessions, id)?;
        let first = !session.advisory_shown;
        session.advisory_shown = true;
        Ok(first)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Look up a live session and refresh its idle timer. An expired session
    /// is removed and reported as not found.
    fn touch<'a>(
        &self,
        sessions: &'a mut HashMap<Uuid, Session>,
        id: Uuid,
    ) -> GlobeResult<&'a mut Session> {
        let now = Utc::now();
        let expired = sessions
            .get(&id)
            .map(|s| self.is_expired(s, now))
            .unwrap_or(false);
        if expired {
            sessions.remove(&id);
            record_sessions_removed(1, 0);
        }

        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| GlobeError::SessionNotFound(id.to_string()))?;
        session.last_seen = now;
        Ok(session)
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.last_seen > self.config.idle_ttl()
    }

    fn prune_idle(&self, sessions: &mut HashMap<Uuid, Session>, now: DateTime<Utc>) -> usize {
        let before = sessions.len();
        sessions.retain(|_, s| !self.is_expired(s, now));
        before - sessions.len()
    }

    /// Drop the least recently seen sessions until one more fits.
    fn evict_to_capacity(&self, sessions: &mut HashMap<Uuid, Session>) -> usize {
        let max = self.config.max_sessions.max(1);
        if sessions.len() < max {
            return 0;
        }

        let mut by_age: Vec<(DateTime<Utc>, Uuid)> =
            sessions.values().map(|s| (s.last_seen, s.id)).collect();
        by_age.sort_unstable();

        let excess = sessions.len() + 1 - max;
        for (_, id) in by_age.into_iter().take(excess) {
            sessions.remove(&id);
        }
        excess
    }
}

fn record_sessions_removed(expired: usize, evicted: usize) {
    crate::metrics::record_sessions_removed("expired", expired);
    crate::metrics::record_sessions_removed("evicted", evicted);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = SessionStore::new();
        let session = store.create(true).await;

        let fetched = store.get(session.id).await.unwrap();
        assert!(fetched.embedded);
        assert!(fetched.rendered.is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = SessionStore::new();
        let err = store.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, GlobeError::SessionNotFound(_)));
        assert!(store.mark_rendered(Uuid::new_v4(), "planet").await.is_err());
    }

    #[tokio::test]
    async fn test_rendered_flag_per_key() {
        let store = SessionStore::new();
        let id = store.create(false).await.id;

        assert!(!store.mark_rendered(id, "planet").await.unwrap());
        assert!(store.mark_rendered(id, "planet").await.unwrap());

        let session = store.get(id).await.unwrap();
        assert!(session.has_rendered("planet"));
        assert!(!session.has_rendered("equator"));
    }

    fn idle_for(store: &SessionStore, sessions: &mut HashMap<Uuid, Session>, id: Uuid) {
        let ttl = store.config.idle_ttl();
        let session = sessions.get_mut(&id).unwrap();
        session.last_seen = session.last_seen - ttl - Duration::seconds(1);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire_on_create() {
        let store = SessionStore::with_config(SessionConfig {
            idle_ttl_secs: 60,
            max_sessions: 100,
        });
        let stale = store.create(false).await.id;
        let fresh = store.create(false).await.id;
        idle_for(&store, &mut *store.sessions.write().await, stale);

        store.create(false).await;

        assert_eq!(store.len().await, 2);
        assert!(matches!(
            store.get(stale).await,
            Err(GlobeError::SessionNotFound(_))
        ));
        assert!(store.get(fresh).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_session_is_not_found_before_pruning() {
        let store = SessionStore::with_config(SessionConfig {
            idle_ttl_secs: 60,
            max_sessions: 100,
        });
        let id = store.create(false).await.id;
        idle_for(&store, &mut *store.sessions.write().await, id);

        assert!(store.mark_rendered(id, "planet").await.is_err());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_seen() {
        let store = SessionStore::with_config(SessionConfig {
            idle_ttl_secs: 3600,
            max_sessions: 3,
        });
        let ids: Vec<Uuid> = {
            let mut ids = Vec::new();
            for _ in 0..3 {
                ids.push(store.create(false).await.id);
            }
            ids
        };
        {
            // Oldest activity first: ids[1], then ids[0], then ids[2]
            let mut sessions = store.sessions.write().await;
            let now = Utc::now();
            sessions.get_mut(&ids[1]).unwrap().last_seen = now - Duration::seconds(30);
            sessions.get_mut(&ids[0]).unwrap().last_seen = now - Duration::seconds(20);
            sessions.get_mut(&ids[2]).unwrap().last_seen = now - Duration::seconds(10);
        }

        for _ in 0..1000 {
            store.create(true).await;
        }
        assert_eq!(store.len().await, 3);
        assert!(store.get(ids[1]).await.is_err());
    }

    #[tokio::test]
    async fn test_get_refreshes_idle_timer() {
        let store = SessionStore::new();
        let session = store.create(false).await;
        let seen = store.get(session.id).await.unwrap();
        assert!(seen.last_seen >= session.last_seen);
        assert_eq!(seen.created_at, session.created_at);
    }

    #[tokio::test]
    async fn test_advisory_once() {
        let store = SessionStore::new();
        let id = store.create(false).await.id;
        assert!(store.take_advisory(id).await.unwrap());
        assert!(!store.take_advisory(id).await.unwrap());
    }
}
