use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::local::LocalRankingCache;
use super::shared::SharedRankingStore;
use crate::error::{RankingError, Result};
use crate::metrics;
use crate::models::{RankedItem, TopList};

/// Upper bound for one shared tier call unless configured otherwise
pub const DEFAULT_SHARED_TIMEOUT: Duration = Duration::from_secs(2);

/// Read-through / write-through façade over the local and shared tiers.
pub struct CompositeRankingCache {
    local: Arc<LocalRankingCache>,
    shared: Arc<dyn SharedRankingStore>,
    shared_key: String,
    shared_ttl: Duration,
    shared_timeout: Duration,
}

impl CompositeRankingCache {
    pub fn new(
        local: Arc<LocalRankingCache>,
        shared: Arc<dyn SharedRankingStore>,
        shared_key: impl Into<String>,
        shared_ttl: Duration,
    ) -> Self {
        Self {
            local,
            shared,
            shared_key: shared_key.into(),
            shared_ttl,
            shared_timeout: DEFAULT_SHARED_TIMEOUT,
        }
    }

    pub fn with_shared_timeout(mut self, shared_timeout: Duration) -> Self {
        self.shared_timeout = shared_timeout;
        self
    }

    /// Local first; on a local miss fall back to the shared tier and
    /// repopulate the local one. Errors only when both tiers miss.
    pub async fn get_top_n(&self) -> Result<Arc<TopList>> {
        let (local, seen_generation) = self.local.get_with_generation().await;
        match local {
            Ok(items) => {
                metrics::record_cache_event("local", "hit");
                return Ok(items);
            }
            Err(e) => {
                metrics::record_cache_event("local", "miss");
                debug!(reason = %e, "Local ranking tier unavailable, trying shared tier");
            }
        }

        let items = match self
            .bounded("read", self.shared.get(&self.shared_key))
            .await
        {
            Ok(items) => {
                metrics::record_cache_event("shared", "hit");
                items
            }
            Err(e) => {
                let event = if e.is_cache_miss() { "miss" } else { "error" };
                metrics::record_cache_event("shared", event);
                return Err(e);
            }
        };

        // Repopulation is an optimisation only. A refresh that landed while
        // the shared tier was being read wins over this older value.
        match self.local.set_if_unchanged(&items, seen_generation).await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                debug!(error = %e, "Failed to repopulate local ranking tier");
                Ok(Arc::new(items))
            }
        }
    }

    /// Write the local tier, then the shared tier.
    ///
    /// A local failure leaves both tiers untouched. A shared failure or
    /// timeout leaves the local tier ahead of the shared one until the next
    /// successful run.
    pub async fn set_top_n(&self, items: &[RankedItem]) -> Result<()> {
        let snapshot = self.local.set(items).await?;

        if let Err(e) = self
            .bounded(
                "write",
                self.shared.set(&self.shared_key, &snapshot, self.shared_ttl),
            )
            .await
        {
            metrics::RANKING_TIER_DIVERGENCE_TOTAL.inc();
            warn!(
                redis_key = %self.shared_key,
                error = %e,
                "Shared ranking tier write failed; local tier is ahead of shared tier"
            );
            return Err(e);
        }

        Ok(())
    }

    async fn bounded<T>(&self, op: &'static str, call: impl Future<Output = Result<T>>) -> Result<T> {
        timeout(self.shared_timeout, call)
            .await
            .map_err(|_| RankingError::CacheTimeout {
                op,
                timeout: self.shared_timeout,
            })?
    }
}
