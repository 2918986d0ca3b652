use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::ScheduledJob;
use crate::error::RankingError;
use crate::services::RankingService;

/// 熱榜刷新任務
pub struct RankingRefreshJob {
    service: Arc<RankingService>,
}

impl RankingRefreshJob {
    pub fn new(service: Arc<RankingService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ScheduledJob for RankingRefreshJob {
    fn name(&self) -> &str {
        "ranking_refresh"
    }

    async fn run(&self, correlation_id: &str) -> Result<()> {
        match self.service.refresh_now().await {
            Ok(outcome) => {
                info!(
                    correlation_id = %correlation_id,
                    items = outcome.items,
                    elapsed_ms = outcome.elapsed_ms,
                    "Hot list refresh stored"
                );
                Ok(())
            }
            // A manual refresh holds the guard; this tick has nothing to do.
            Err(RankingError::RefreshInProgress) => {
                info!(correlation_id = %correlation_id, "Refresh already running, skipping tick");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
