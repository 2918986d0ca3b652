//! Fakes shared by the service and job unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use super::{BatchRankingComputation, RankingService};
use crate::cache::shared::MockSharedRankingStore;
use crate::cache::{CompositeRankingCache, LocalRankingCache, SharedRankingStore};
use crate::config::RankingConfig;
use crate::error::{RankingError, Result};
use crate::models::{Article, ArticleStatus, Author, Interactive, RankedItem, TopList};
use crate::services::sources::{ContentSource, PopularitySource};

/// Single page of articles; can be switched to failing or gated on a notify.
pub struct FakeContent {
    articles: Vec<Article>,
    pub failing: AtomicBool,
    /// Signalled as soon as a page is requested
    pub entered: Notify,
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl ContentSource for FakeContent {
    async fn public_list(
        &self,
        _as_of: DateTime<Utc>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Article>> {
        self.entered.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(RankingError::Source("content store down".into()));
        }
        Ok(self.articles.iter().skip(offset).take(limit).cloned().collect())
    }
}

struct FakePopularity(HashMap<i64, i64>);

#[async_trait]
impl PopularitySource for FakePopularity {
    async fn counts_by_ids(&self, biz: &str, ids: &[i64]) -> Result<HashMap<i64, Interactive>> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.0.get(id).map(|likes| {
                    (
                        *id,
                        Interactive {
                            biz: biz.to_string(),
                            biz_id: *id,
                            like_cnt: *likes,
                            ..Default::default()
                        },
                    )
                })
            })
            .collect())
    }
}

/// Shared tier whose writes never complete
pub struct HangingStore;

#[async_trait]
impl SharedRankingStore for HangingStore {
    async fn get(&self, _key: &str) -> Result<TopList> {
        Err(RankingError::CacheMiss("shared tier empty"))
    }

    async fn set(&self, _key: &str, _items: &[RankedItem], _ttl: Duration) -> Result<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

fn article(id: i64) -> Article {
    let now = Utc::now();
    Article {
        id,
        title: format!("article-{}", id),
        content: "body".to_string(),
        author: Author::default(),
        status: ArticleStatus::Published,
        ctime: now,
        utime: now,
    }
}

pub fn accepting_store() -> Arc<dyn SharedRankingStore> {
    let mut shared = MockSharedRankingStore::new();
    shared.expect_set().returning(|_, _, _| Ok(()));
    shared
        .expect_get()
        .returning(|_| Err(RankingError::CacheMiss("shared tier empty")));
    Arc::new(shared)
}

/// Articles 1..=3 with likes 5, 9, 1; gated on `gate` when given.
pub fn content(gate: Option<Arc<Notify>>) -> Arc<FakeContent> {
    Arc::new(FakeContent {
        articles: vec![article(1), article(2), article(3)],
        failing: AtomicBool::new(false),
        entered: Notify::new(),
        gate,
    })
}

/// Top-2 service over `content`, writing to `shared` with a 2s shared tier deadline.
pub fn service_with_store(
    content: Arc<FakeContent>,
    shared: Arc<dyn SharedRankingStore>,
    computation_timeout: Duration,
) -> RankingService {
    let popularity = Arc::new(FakePopularity(HashMap::from([(1, 5), (2, 9), (3, 1)])));
    let computation = BatchRankingComputation::new(
        content,
        popularity,
        &RankingConfig {
            top_n: 2,
            batch_size: 10,
            ..Default::default()
        },
        Duration::from_secs(60),
    );
    let cache = Arc::new(
        CompositeRankingCache::new(
            Arc::new(LocalRankingCache::new(Duration::from_secs(1800), 100)),
            shared,
            "ranking:top_n",
            Duration::from_secs(180),
        )
        .with_shared_timeout(Duration::from_secs(2)),
    );
    RankingService::new(computation, cache, computation_timeout)
}

pub fn service(content: Arc<FakeContent>, computation_timeout: Duration) -> RankingService {
    service_with_store(content, accepting_store(), computation_timeout)
}

pub fn ids(items: &[RankedItem]) -> Vec<i64> {
    items.iter().map(|i| i.id).collect()
}
