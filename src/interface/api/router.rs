//! API Router configuration

use super::health_handler::health_check;
use super::metrics_handler::metrics_handler;
use super::webhook_handler::{
    dial_status_webhook, mobile_dial_status_webhook, outbound_webhook, recording_status_webhook,
    recording_webhook, voice_webhook, AppState,
};
use crate::domain::routing::CallbackRoute;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

/// Build the API router
pub fn build_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    let health_routes = Router::new().route("/health", get(health_check));

    // Provider callbacks
    let webhook_routes = Router::new()
        .route(CallbackRoute::Voice.path(), post(voice_webhook))
        .route(CallbackRoute::DialStatus.path(), post(dial_status_webhook))
        .route(
            CallbackRoute::MobileDialStatus.path(),
            post(mobile_dial_status_webhook),
        )
        .route(CallbackRoute::Outbound.path(), post(outbound_webhook))
        .route(CallbackRoute::Recording.path(), post(recording_webhook))
        .route(
            CallbackRoute::RecordingStatus.path(),
            post(recording_status_webhook),
        );

    // Metrics route (separate state)
    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    Router::new()
        .merge(health_routes)
        .merge(webhook_routes)
        .with_state(state)
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
}
