use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of characters kept when an article body is cut down to its abstract
pub const DEFAULT_ABSTRACT_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    /// Full body as read from the content source; holds only the abstract
    /// once the article has been written to a ranking cache tier.
    pub content: String,
    pub author: Author,
    pub status: ArticleStatus,
    pub ctime: DateTime<Utc>,
    pub utime: DateTime<Utc>,
}

impl Article {
    /// First `max_chars` characters of the body, cut on a char boundary.
    pub fn abstract_text(&self, max_chars: usize) -> String {
        match self.content.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => self.content[..byte_idx].to_string(),
            None => self.content.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    #[default]
    Unknown,
    Unpublished,
    Published, // 讀者可見
    Private,
    Archived, // 已刪除
}

impl ArticleStatus {
    pub fn as_u8(&self) -> u8 {
        match self {
            ArticleStatus::Unknown => 0,
            ArticleStatus::Unpublished => 1,
            ArticleStatus::Published => 2,
            ArticleStatus::Private => 3,
            ArticleStatus::Archived => 4,
        }
    }

    pub fn from_u8(code: u8) -> Self {
        match code {
            1 => ArticleStatus::Unpublished,
            2 => ArticleStatus::Published,
            3 => ArticleStatus::Private,
            4 => ArticleStatus::Archived,
            _ => ArticleStatus::Unknown,
        }
    }
}

/// Interaction counters of one biz entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interactive {
    pub biz: String,
    pub biz_id: i64,
    pub read_cnt: i64,
    pub like_cnt: i64,
    pub collect_cnt: i64,
}

/// One entry of the hot list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub id: i64,
    pub score: f64,
    pub article: Article,
}

impl RankedItem {
    pub fn new(score: f64, article: Article) -> Self {
        Self {
            id: article.id,
            score,
            article,
        }
    }

    /// Copy of this item with the article body replaced by its abstract.
    pub fn abstracted(&self, max_chars: usize) -> Self {
        let mut article = self.article.clone();
        article.content = self.article.abstract_text(max_chars);
        Self {
            id: self.id,
            score: self.score,
            article,
        }
    }
}

/// Hot list ordered by score descending, ties by ascending id
pub type TopList = Vec<RankedItem>;
