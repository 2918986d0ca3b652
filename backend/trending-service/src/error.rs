use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RankingError>;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Content source error: {0}")]
    Source(String),

    #[error("{source_name} did not answer within {timeout:?}")]
    SourceTimeout {
        source_name: &'static str,
        timeout: Duration,
    },

    #[error("Ranking computation exceeded {0:?}")]
    ComputationTimeout(Duration),

    #[error("Cache miss: {0}")]
    CacheMiss(&'static str),

    #[error("Cache write error: {0}")]
    CacheWrite(String),

    #[error("Shared tier {op} did not finish within {timeout:?}")]
    CacheTimeout { op: &'static str, timeout: Duration },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("A ranking refresh is already running")]
    RefreshInProgress,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RankingError {
    /// Errors raised while pulling from the content or popularity providers.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            RankingError::Source(_) | RankingError::SourceTimeout { .. } | RankingError::Database(_)
        )
    }

    pub fn is_cache_miss(&self) -> bool {
        matches!(self, RankingError::CacheMiss(_))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ResponseError for RankingError {
    fn status_code(&self) -> StatusCode {
        match self {
            RankingError::RefreshInProgress => StatusCode::CONFLICT,
            RankingError::CacheMiss(_) => StatusCode::NOT_FOUND,
            RankingError::SourceTimeout { .. }
            | RankingError::ComputationTimeout(_)
            | RankingError::CacheTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            RankingError::Source(_) | RankingError::Database(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_type = match self {
            RankingError::Source(_) | RankingError::Database(_) => "SOURCE_ERROR",
            RankingError::SourceTimeout { .. } => "SOURCE_TIMEOUT",
            RankingError::ComputationTimeout(_) => "COMPUTATION_TIMEOUT",
            RankingError::CacheMiss(_) => "CACHE_MISS",
            RankingError::CacheWrite(_) | RankingError::Redis(_) => "CACHE_ERROR",
            RankingError::CacheTimeout { .. } => "CACHE_TIMEOUT",
            RankingError::Serialization(_) => "SERIALIZATION_ERROR",
            RankingError::RefreshInProgress => "REFRESH_IN_PROGRESS",
            RankingError::Config(_) => "CONFIG_ERROR",
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        })
    }
}
