//! Profiles cache in front of the aggregation pipeline.
//!
//! `AppState` holds an `Arc<dyn ProfileCache>`: Redis when `REDIS_URL` is
//! configured (shared across instances), otherwise a process-local cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::Profile;

pub mod redis_cache;

pub use redis_cache::RedisCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedProfiles {
    pub profiles: Vec<Profile>,
    pub stored_at: DateTime<Utc>,
}

impl CachedProfiles {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self {
            profiles,
            stored_at: Utc::now(),
        }
    }

    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.stored_at).num_seconds().max(0)
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        u64::try_from(self.age_secs(now)).unwrap_or(0) < ttl.as_secs()
    }
}

#[async_trait]
pub trait ProfileCache: Send + Sync {
    /// The cached leaderboard, or `None` when absent or expired.
    async fn get(&self) -> Result<Option<CachedProfiles>, CacheError>;

    async fn put(&self, profiles: Vec<Profile>) -> Result<(), CacheError>;

    fn ttl(&self) -> Duration;
}

/// Redis when a URL is configured, otherwise a `MemoryCache`.
pub fn from_url(redis_url: Option<&str>, ttl: Duration) -> Result<Arc<dyn ProfileCache>, CacheError> {
    match redis_url {
        Some(url) => {
            let client = redis::Client::open(url)?;
            info!("Profiles cache: redis (ttl {}s)", ttl.as_secs());
            Ok(Arc::new(RedisCache::new(client, ttl)))
        }
        None => {
            info!("Profiles cache: in-process (ttl {}s)", ttl.as_secs());
            Ok(Arc::new(MemoryCache::new(ttl)))
        }
    }
}

/// Process-local cache. Expired entries read as absent.
pub struct MemoryCache {
    entry: RwLock<Option<CachedProfiles>>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            ttl,
        }
    }
}

#[async_trait]
impl ProfileCache for MemoryCache {
    async fn get(&self) -> Result<Option<CachedProfiles>, CacheError> {
        let entry = self.entry.read().await;
        Ok(entry
            .as_ref()
            .filter(|e| e.is_fresh(Utc::now(), self.ttl))
            .cloned())
    }

    async fn put(&self, profiles: Vec<Profile>) -> Result<(), CacheError> {
        *self.entry.write().await = Some(CachedProfiles::new(profiles));
        Ok(())
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::fixtures::profile;

    #[tokio::test]
    async fn test_memory_cache_roundtrip() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        assert!(cache.get().await.unwrap().is_none());

        cache.put(vec![profile(1, 50), profile(2, 40)]).await.unwrap();
        let cached = cache.get().await.unwrap().expect("fresh entry");
        assert_eq!(cached.profiles.len(), 2);
        assert_eq!(cached.profiles[0].builder_score, 50);
    }

    #[tokio::test]
    async fn test_memory_cache_zero_ttl_is_always_stale() {
        let cache = MemoryCache::new(Duration::ZERO);
        cache.put(vec![profile(1, 50)]).await.unwrap();
        assert!(cache.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_from_url_without_redis_is_in_process() {
        let cache = from_url(None, Duration::from_secs(30)).unwrap();
        assert_eq!(cache.ttl(), Duration::from_secs(30));
        cache.put(vec![profile(7, 1)]).await.unwrap();
        assert_eq!(cache.get().await.unwrap().unwrap().profiles.len(), 1);
    }

    #[test]
    fn test_from_url_rejects_bad_redis_url() {
        assert!(from_url(Some("not a url"), Duration::from_secs(30)).is_err());
    }

    #[test]
    fn test_cached_profiles_age() {
        let mut cached = CachedProfiles::new(Vec::new());
        let now = Utc::now();
        cached.stored_at = now - chrono::Duration::seconds(90);
        assert_eq!(cached.age_secs(now), 90);
        assert!(cached.is_fresh(now, Duration::from_secs(91)));
        assert!(!cached.is_fresh(now, Duration::from_secs(90)));
    }

    #[test]
    fn test_age_never_negative() {
        let mut cached = CachedProfiles::new(Vec::new());
        let now = Utc::now();
        cached.stored_at = now + chrono::Duration::seconds(5);
        assert_eq!(cached.age_secs(now), 0);
    }
}
