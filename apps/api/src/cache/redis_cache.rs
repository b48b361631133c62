use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::Client as RedisClient;
use tracing::debug;

use super::{CacheError, CachedProfiles, ProfileCache};
use crate::models::Profile;

pub const PROFILES_KEY: &str = "leaderboard:profiles";

/// Cache stored as one JSON document under `PROFILES_KEY`, expired by Redis itself.
pub struct RedisCache {
    client: RedisClient,
    ttl: Duration,
}

impl RedisCache {
    pub fn new(client: RedisClient, ttl: Duration) -> Self {
        Self { client, ttl }
    }
}

#[async_trait]
impl ProfileCache for RedisCache {
    async fn get(&self) -> Result<Option<CachedProfiles>, CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(PROFILES_KEY)
            .query_async(&mut conn)
            .await?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        let cached: CachedProfiles = serde_json::from_str(&raw)?;
        // TTL may have been lowered since the write.
        if !cached.is_fresh(Utc::now(), self.ttl) {
            debug!("Ignoring cached profiles older than the configured TTL");
            return Ok(None);
        }
        Ok(Some(cached))
    }

    async fn put(&self, profiles: Vec<Profile>) -> Result<(), CacheError> {
        if self.ttl.is_zero() {
            return Ok(());
        }
        let payload = serde_json::to_string(&CachedProfiles::new(profiles))?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(PROFILES_KEY)
            .arg(payload)
            .arg("EX")
            .arg(self.ttl.as_secs())
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
