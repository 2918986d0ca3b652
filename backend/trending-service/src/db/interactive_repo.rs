use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;

use crate::error::Result;
use crate::models::Interactive;
use crate::services::sources::PopularitySource;

#[derive(Debug, FromRow)]
struct InteractiveRow {
    biz: String,
    biz_id: i64,
    read_cnt: i64,
    like_cnt: i64,
    collect_cnt: i64,
}

impl From<InteractiveRow> for Interactive {
    fn from(row: InteractiveRow) -> Self {
        Interactive {
            biz: row.biz,
            biz_id: row.biz_id,
            read_cnt: row.read_cnt,
            like_cnt: row.like_cnt,
            collect_cnt: row.collect_cnt,
        }
    }
}

/// Reads the per-entity interaction counters.
#[derive(Clone)]
pub struct PgPopularitySource {
    pool: PgPool,
}

impl PgPopularitySource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PopularitySource for PgPopularitySource {
    async fn counts_by_ids(&self, biz: &str, ids: &[i64]) -> Result<HashMap<i64, Interactive>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, InteractiveRow>(
            r#"
            SELECT biz, biz_id, read_cnt, like_cnt, collect_cnt
            FROM interactives
            WHERE biz = $1 AND biz_id = ANY($2)
            "#,
        )
        .bind(biz)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.biz_id, Interactive::from(row)))
            .collect())
    }
}
