use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RankingError;
use crate::models::RankedItem;
use crate::services::RankingService;

#[derive(Debug, Deserialize)]
pub struct TopNQuery {
    /// Truncate the list. Missing or malformed values mean the whole list.
    pub limit: Option<String>,
}

impl TopNQuery {
    fn limit(&self) -> Option<usize> {
        let raw = self.limit.as_deref()?;
        match raw.trim().parse() {
            Ok(limit) => Some(limit),
            Err(_) => {
                debug!(limit = %raw, "Ignoring malformed limit");
                None
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopNResponse {
    pub items: Vec<RankedItem>,
    /// Set when no cached list could be read and `items` is empty because of it.
    pub degraded: bool,
}

/// Serve the hot list. Never triggers a computation.
///
/// When both tiers are unavailable the page still renders: the response is
/// an empty list flagged as degraded.
pub async fn get_top_n(
    service: web::Data<RankingService>,
    query: web::Query<TopNQuery>,
) -> HttpResponse {
    match service.get_top_n().await {
        Ok(items) => {
            let limit = query.limit().unwrap_or(items.len()).min(items.len());
            HttpResponse::Ok().json(TopNResponse {
                items: items[..limit].to_vec(),
                degraded: false,
            })
        }
        Err(e) => {
            warn!(error = %e, "Hot list unavailable, serving degraded response");
            HttpResponse::Ok().json(TopNResponse {
                items: Vec::new(),
                degraded: true,
            })
        }
    }
}

/// Manual refresh. Shares the overlap guard with the scheduled job.
pub async fn refresh(service: web::Data<RankingService>) -> Result<HttpResponse, RankingError> {
    let outcome = service.refresh_now().await?;
    Ok(HttpResponse::Ok().json(outcome))
}
