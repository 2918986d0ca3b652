//! In-memory stand-ins for the external providers and the shared tier.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use tokio::time::Instant;
use trending_service::cache::{CompositeRankingCache, LocalRankingCache, SharedRankingStore};
use trending_service::config::RankingConfig;
use trending_service::models::{Article, ArticleStatus, Author, Interactive, RankedItem, TopList};
use trending_service::services::{ContentSource, PopularitySource};
use trending_service::{BatchRankingComputation, RankingError, RankingService, Result};

/// Fixed reference instant so that equal ages give equal `utime`s.
fn base_time() -> DateTime<Utc> {
    static BASE: OnceLock<DateTime<Utc>> = OnceLock::new();
    *BASE.get_or_init(Utc::now)
}

pub fn article(id: i64, age_secs: i64, content: &str) -> Article {
    let utime = base_time() - ChronoDuration::seconds(age_secs);
    Article {
        id,
        title: format!("article-{}", id),
        content: content.to_string(),
        author: Author {
            id: 1000 + id,
            name: format!("author-{}", id),
        },
        status: ArticleStatus::Published,
        ctime: utime,
        utime,
    }
}

/// Article table ordered by recency; can be told to fail from a given page on.
pub struct InMemoryContent {
    articles: Vec<Article>,
    fail_from_offset: Mutex<Option<usize>>,
    pub calls: AtomicUsize,
}

impl InMemoryContent {
    pub fn new(mut articles: Vec<Article>) -> Arc<Self> {
        articles.sort_by(|a, b| b.utime.cmp(&a.utime).then(a.id.cmp(&b.id)));
        Arc::new(Self {
            articles,
            fail_from_offset: Mutex::new(None),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn fail_from(&self, offset: Option<usize>) {
        *self.fail_from_offset.lock().unwrap() = offset;
    }
}

#[async_trait]
impl ContentSource for InMemoryContent {
    async fn public_list(
        &self,
        as_of: DateTime<Utc>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Article>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(fail_at) = *self.fail_from_offset.lock().unwrap() {
            if offset >= fail_at {
                return Err(RankingError::Source(format!("page at offset {} unavailable", offset)));
            }
        }
        Ok(self
            .articles
            .iter()
            .filter(|a| a.utime < as_of)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Like counters per article; records every id set it was asked for.
pub struct InMemoryPopularity {
    likes: HashMap<i64, i64>,
    pub lookups: Mutex<Vec<Vec<i64>>>,
}

impl InMemoryPopularity {
    pub fn new(likes: &[(i64, i64)]) -> Arc<Self> {
        Arc::new(Self {
            likes: likes.iter().copied().collect(),
            lookups: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl PopularitySource for InMemoryPopularity {
    async fn counts_by_ids(&self, biz: &str, ids: &[i64]) -> Result<HashMap<i64, Interactive>> {
        self.lookups.lock().unwrap().push(ids.to_vec());
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.likes.get(id).map(|likes| {
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

/// Shared tier with expiry on the tokio clock, mirroring SET EX / GET.
#[derive(Default)]
pub struct InMemorySharedStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub fail_writes: AtomicBool,
}

impl InMemorySharedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone())
    }
}

#[async_trait]
impl SharedRankingStore for InMemorySharedStore {
    async fn get(&self, key: &str) -> Result<TopList> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((data, deadline)) if Instant::now() < *deadline => Ok(serde_json::from_str(data)?),
            _ => Err(RankingError::CacheMiss("shared tier empty")),
        }
    }

    async fn set(&self, key: &str, items: &[RankedItem], ttl: Duration) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RankingError::CacheWrite("shared tier unavailable".into()));
        }
        self.sets.fetch_add(1, Ordering::SeqCst);
        let data = serde_json::to_string(items)?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, Instant::now() + ttl));
        Ok(())
    }
}

pub const SHARED_KEY: &str = "ranking:top_n";

pub struct Harness {
    pub content: Arc<InMemoryContent>,
    pub popularity: Arc<InMemoryPopularity>,
    pub local: Arc<LocalRankingCache>,
    pub shared: Arc<InMemorySharedStore>,
    pub service: Arc<RankingService>,
}

pub fn harness(
    articles: Vec<Article>,
    likes: &[(i64, i64)],
    top_n: usize,
    batch_size: usize,
) -> Harness {
    let content = InMemoryContent::new(articles);
    let popularity = InMemoryPopularity::new(likes);
    let local = Arc::new(LocalRankingCache::new(Duration::from_secs(30 * 60), 100));
    let shared = InMemorySharedStore::new();

    let computation = BatchRankingComputation::new(
        content.clone(),
        popularity.clone(),
        &RankingConfig {
            top_n,
            batch_size,
            ..Default::default()
        },
        Duration::from_secs(5),
    );
    let cache = Arc::new(CompositeRankingCache::new(
        local.clone(),
        shared.clone(),
        SHARED_KEY,
        Duration::from_secs(3 * 60),
    ));
    let service = Arc::new(RankingService::new(
        computation,
        cache,
        Duration::from_secs(30),
    ));

    Harness {
        content,
        popularity,
        local,
        shared,
        service,
    }
}

pub fn ids(items: &[RankedItem]) -> Vec<i64> {
    items.iter().map(|i| i.id).collect()
}
