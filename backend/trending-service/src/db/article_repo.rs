use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::error::Result;
use crate::models::{Article, ArticleStatus, Author};
use crate::services::sources::ContentSource;

#[derive(Debug, FromRow)]
struct PublishedArticleRow {
    id: i64,
    title: String,
    content: String,
    author_id: i64,
    author_name: Option<String>,
    status: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PublishedArticleRow> for Article {
    fn from(row: PublishedArticleRow) -> Self {
        Article {
            id: row.id,
            title: row.title,
            content: row.content,
            author: Author {
                id: row.author_id,
                name: row.author_name.unwrap_or_default(),
            },
            status: ArticleStatus::from_u8(row.status as u8),
            ctime: row.created_at,
            utime: row.updated_at,
        }
    }
}

/// Reads the reader-facing article table.
#[derive(Clone)]
pub struct PgContentSource {
    pool: PgPool,
}

impl PgContentSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentSource for PgContentSource {
    async fn public_list(
        &self,
        as_of: DateTime<Utc>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, PublishedArticleRow>(
            r#"
            SELECT a.id, a.title, a.content, a.author_id, u.username AS author_name,
                   a.status, a.created_at, a.updated_at
            FROM published_articles a
            LEFT JOIN users u ON u.id = a.author_id
            WHERE a.updated_at < $1 AND a.status = $2
            ORDER BY a.updated_at DESC, a.id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(as_of)
        .bind(ArticleStatus::Published.as_u8() as i16)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }
}
