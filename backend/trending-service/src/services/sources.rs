//! Read contracts the ranking engine consumes from the rest of the platform.
//!
//! Concrete PostgreSQL implementations live in `crate::db`; tests substitute
//! mocks or in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::Result;
use crate::models::{Article, Interactive};

/// Publicly visible articles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Articles last updated before `as_of`, most recent first. Only the final
    /// page may hold fewer than `limit` items.
    async fn public_list(
        &self,
        as_of: DateTime<Utc>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Article>>;
}

/// Interaction counters (likes / reads / collects)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PopularitySource: Send + Sync {
    /// Counters keyed by biz id. Ids without a record are left out of the map.
    async fn counts_by_ids(&self, biz: &str, ids: &[i64]) -> Result<HashMap<i64, Interactive>>;
}
