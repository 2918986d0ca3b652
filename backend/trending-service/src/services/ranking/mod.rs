mod compute;
mod score;
mod top_k;

#[cfg(test)]
pub(crate) mod test_support;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::cache::CompositeRankingCache;
use crate::error::{RankingError, Result};
use crate::metrics;
use crate::models::TopList;

pub use compute::BatchRankingComputation;
pub use score::{default_score_fn, hot_score, ScoreFn};
pub use top_k::BoundedTopK;

/// Summary of one successful refresh
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub as_of: DateTime<Utc>,
    pub items: usize,
    pub elapsed_ms: u64,
}

/// 熱榜服務: read path + refresh entry point
///
/// Reads only ever touch the cache tiers. Refreshes are serialised by a
/// non-blocking guard: a refresh requested while another is running is
/// rejected with `RefreshInProgress` instead of queueing.
pub struct RankingService {
    computation: BatchRankingComputation,
    cache: Arc<CompositeRankingCache>,
    computation_timeout: Duration,
    refresh_guard: Mutex<()>,
}

impl RankingService {
    pub fn new(
        computation: BatchRankingComputation,
        cache: Arc<CompositeRankingCache>,
        computation_timeout: Duration,
    ) -> Self {
        Self {
            computation,
            cache,
            computation_timeout,
            refresh_guard: Mutex::new(()),
        }
    }

    /// Current hot list. An error means no usable ranking is cached.
    pub async fn get_top_n(&self) -> Result<Arc<TopList>> {
        self.cache.get_top_n().await
    }

    /// Recompute the hot list and replace both cache tiers.
    ///
    /// On any computation error the cached list is left as it was.
    pub async fn refresh_now(&self) -> Result<RefreshOutcome> {
        let _running = match self.refresh_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                metrics::record_refresh("skipped");
                return Err(RankingError::RefreshInProgress);
            }
        };

        let start = Instant::now();
        let as_of = Utc::now();

        let items = match timeout(
            self.computation_timeout,
            self.computation.compute_top_n(as_of),
        )
        .await
        {
            Ok(Ok(items)) => items,
            Ok(Err(e)) => {
                metrics::record_refresh(if e.is_source_error() {
                    "source_error"
                } else {
                    "error"
                });
                return Err(e);
            }
            Err(_) => {
                metrics::record_refresh("timeout");
                warn!(
                    timeout_ms = self.computation_timeout.as_millis() as u64,
                    "Hot list computation timed out; keeping cached list"
                );
                return Err(RankingError::ComputationTimeout(self.computation_timeout));
            }
        };

        if let Err(e) = self.cache.set_top_n(&items).await {
            metrics::record_refresh("cache_error");
            return Err(e);
        }

        let elapsed = start.elapsed();
        metrics::record_refresh("success");
        metrics::RANKING_REFRESH_DURATION_SECONDS.observe(elapsed.as_secs_f64());

        info!(
            as_of = %as_of,
            items = items.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Hot list refreshed"
        );

        Ok(RefreshOutcome {
            as_of,
            items: items.len(),
            elapsed_ms: elapsed.as_millis() as u64,
        })
    }
}
