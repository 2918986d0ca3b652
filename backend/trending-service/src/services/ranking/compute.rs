use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

use super::score::{default_score_fn, ScoreFn};
use super::top_k::BoundedTopK;
use crate::config::RankingConfig;
use crate::error::{RankingError, Result};
use crate::models::{Article, Interactive, RankedItem, TopList};
use crate::services::sources::{ContentSource, PopularitySource};

/// Scans the content source page by page and keeps the hottest `top_n` articles.
pub struct BatchRankingComputation {
    content: Arc<dyn ContentSource>,
    popularity: Arc<dyn PopularitySource>,
    top_n: usize,
    batch_size: usize,
    biz: String,
    provider_timeout: Duration,
    score_fn: ScoreFn,
}

impl BatchRankingComputation {
    pub fn new(
        content: Arc<dyn ContentSource>,
        popularity: Arc<dyn PopularitySource>,
        config: &RankingConfig,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            content,
            popularity,
            top_n: config.top_n,
            batch_size: config.batch_size,
            biz: config.biz.clone(),
            provider_timeout,
            score_fn: default_score_fn(),
        }
    }

    /// Replace the score function
    pub fn with_score_fn(mut self, score_fn: ScoreFn) -> Self {
        self.score_fn = score_fn;
        self
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Compute the hot list as of `as_of`.
    ///
    /// `as_of` bounds every page of the scan. Any provider error aborts the
    /// whole run and nothing computed so far is returned.
    pub async fn compute_top_n(&self, as_of: DateTime<Utc>) -> Result<TopList> {
        let mut top = BoundedTopK::new(self.top_n);
        let mut seen: HashSet<i64> = HashSet::new();
        let mut offset = 0usize;
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(as_of, offset).await?;
            if page.is_empty() {
                break;
            }
            pages += 1;

            let ids: Vec<i64> = page.iter().map(|art| art.id).collect();
            let counts = self.fetch_counts(&ids).await?;

            let page_len = page.len();
            for article in page {
                if !seen.insert(article.id) {
                    debug!(article_id = article.id, "Skipping article seen on an earlier page");
                    continue;
                }
                let like_cnt = counts.get(&article.id).map(|c| c.like_cnt).unwrap_or(0);
                let score = (self.score_fn)(like_cnt, article.utime, as_of);
                top.offer(RankedItem::new(score, article));
            }

            debug!(offset, page_len, retained = top.len(), "Scored article page");

            offset += page_len;
            if page_len != self.batch_size {
                break;
            }
        }

        let items = top.drain();
        info!(
            as_of = %as_of,
            pages,
            scanned = offset,
            top_n = items.len(),
            "Hot list computed"
        );

        Ok(items)
    }

    async fn fetch_page(&self, as_of: DateTime<Utc>, offset: usize) -> Result<Vec<Article>> {
        self.bounded(
            "content source",
            self.content.public_list(as_of, offset, self.batch_size),
        )
        .await
    }

    async fn fetch_counts(&self, ids: &[i64]) -> Result<HashMap<i64, Interactive>> {
        self.bounded(
            "popularity source",
            self.popularity.counts_by_ids(&self.biz, ids),
        )
        .await
    }

    async fn bounded<T>(
        &self,
        source_name: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        timeout(self.provider_timeout, call)
            .await
            .map_err(|_| RankingError::SourceTimeout {
                source_name,
                timeout: self.provider_timeout,
            })?
    }
}
