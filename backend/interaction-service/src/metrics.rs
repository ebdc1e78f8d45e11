//! Prometheus metrics for the interaction service.
//!
//! Exposes pipeline-specific collectors and an HTTP handler for the
//! `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_int_counter_vec, Encoder, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Interactions accepted on the HTTP surface, segmented by action and outcome.
    pub static ref INTERACTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "interactions_total",
        "Interactions submitted segmented by action and outcome",
        &["action", "outcome"]
    )
    .expect("failed to register interactions_total");

    /// Vote events enqueued into the write buffer, segmented by action.
    pub static ref VOTES_ENQUEUED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "votes_enqueued_total",
        "Vote events enqueued into the write buffer segmented by action",
        &["action"]
    )
    .expect("failed to register votes_enqueued_total");

    /// Vote sync cycles, segmented by result (applied/failed/empty).
    pub static ref VOTE_SYNC_GROUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "vote_sync_groups_total",
        "Grouped increments applied by the vote sync worker segmented by result",
        &["result"]
    )
    .expect("failed to register vote_sync_groups_total");

    /// Vote events dropped without being applied (buffer failure or sync failure).
    pub static ref VOTES_DROPPED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "votes_dropped_total",
        "Vote events dropped segmented by stage",
        &["stage"]
    )
    .expect("failed to register votes_dropped_total");

    /// Post cache events (hit/miss/error), segmented by cache kind.
    pub static ref POST_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "post_cache_events_total",
        "Post cache events segmented by cache and outcome",
        &["cache", "event"]
    )
    .expect("failed to register post_cache_events_total");
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
