use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{RankingError, Result};
use crate::models::{RankedItem, TopList};

/// Externally shared tier (Redis in production).
///
/// Reads never renew the TTL: a hot list that keeps being read must still
/// expire once refreshes stop.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SharedRankingStore: Send + Sync {
    /// Returns `RankingError::CacheMiss` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<TopList>;

    async fn set(&self, key: &str, items: &[RankedItem], ttl: Duration) -> Result<()>;
}

/// Redis-backed shared tier storing the hot list as one JSON value.
#[derive(Clone)]
pub struct RedisRankingCache {
    redis: ConnectionManager,
}

impl RedisRankingCache {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl SharedRankingStore for RedisRankingCache {
    async fn get(&self, key: &str) -> Result<TopList> {
        let mut conn = self.redis.clone();

        // Plain GET: no GETEX / EXPIRE, the TTL keeps running down.
        let data: Option<String> = conn.get(key).await?;
        let Some(data) = data else {
            debug!(redis_key = %key, "Shared ranking tier MISS");
            return Err(RankingError::CacheMiss("shared tier empty"));
        };

        match decode_top_list(&data) {
            Some(items) => {
                debug!(redis_key = %key, items = items.len(), "Shared ranking tier HIT");
                Ok(items)
            }
            None => {
                warn!(redis_key = %key, "Corrupted hot list in Redis, deleting");
                if let Err(del_err) = conn.del::<_, ()>(key).await {
                    warn!(redis_key = %key, error = %del_err, "Failed to delete corrupted hot list");
                }
                Err(RankingError::CacheMiss("shared tier corrupted"))
            }
        }
    }

    async fn set(&self, key: &str, items: &[RankedItem], ttl: Duration) -> Result<()> {
        let data = serde_json::to_string(items)?;
        // SET EX rejects a zero expiry
        let ttl_secs = ttl.as_secs().max(1);

        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(key, data, ttl_secs)
            .await
            .map_err(|e| RankingError::CacheWrite(format!("redis SET {}: {}", key, e)))?;

        debug!(redis_key = %key, ttl_secs, items = items.len(), "Shared ranking tier WRITE");
        Ok(())
    }
}

/// `None` when the stored value is not a hot list and must be evicted.
fn decode_top_list(data: &str) -> Option<TopList> {
    match serde_json::from_str::<TopList>(data) {
        Ok(items) => Some(items),
        Err(e) => {
            debug!(error = %e, "Hot list payload failed to decode");
            None
        }
    }
}
