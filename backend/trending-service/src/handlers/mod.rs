//! HTTP surface
//!
//! - `GET  /api/v1/ranking/top`: hot list from the cache tiers
//! - `POST /api/v1/ranking/refresh`: run a refresh now
//! - `GET  /api/v1/health`

pub mod ranking;

use actix_web::{web, HttpResponse};

pub use ranking::{get_top_n, refresh, TopNQuery, TopNResponse};

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "trending-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/health", web::get().to(health))
        .route("/metrics", web::get().to(crate::metrics::serve_metrics))
        .service(
            web::scope("/api/v1/ranking")
                .route("/top", web::get().to(ranking::get_top_n))
                .route("/refresh", web::post().to(ranking::refresh)),
        );
}
