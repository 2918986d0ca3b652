//! Prometheus metrics for trending-service.
//!
//! Collectors register with the default registry; `/metrics` renders them.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Refresh runs segmented by outcome (success, source_error, cache_error, timeout, skipped).
    pub static ref RANKING_REFRESH_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ranking_refresh_total",
        "Hot list refresh runs segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register ranking_refresh_total");

    /// Wall time of successful refresh runs.
    pub static ref RANKING_REFRESH_DURATION_SECONDS: Histogram = register_histogram!(
        "ranking_refresh_duration_seconds",
        "Duration of hot list refresh runs"
    )
    .expect("failed to register ranking_refresh_duration_seconds");

    /// Read path events per tier (hit/miss/error).
    pub static ref RANKING_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "ranking_cache_events_total",
        "Hot list cache events segmented by tier and outcome",
        &["tier", "event"]
    )
    .expect("failed to register ranking_cache_events_total");

    /// Writes where the local tier was updated but the shared tier was not.
    pub static ref RANKING_TIER_DIVERGENCE_TOTAL: IntCounter = register_int_counter!(
        "ranking_tier_divergence_total",
        "Refreshes that left the local and shared tiers out of sync"
    )
    .expect("failed to register ranking_tier_divergence_total");
}

pub fn record_refresh(outcome: &str) {
    RANKING_REFRESH_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_cache_event(tier: &str, event: &str) {
    RANKING_CACHE_EVENTS.with_label_values(&[tier, event]).inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
