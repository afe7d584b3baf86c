//! Prometheus metrics handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and describe the service metrics
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("recording_fetch_attempts".to_string()),
            &[1.0, 2.0, 3.0, 4.0, 5.0, 8.0, 10.0],
        )?
        .install_recorder()?;

    describe_counter!(
        "webhook_requests_total",
        "Provider webhook callbacks received, by route"
    );
    describe_counter!(
        "routing_decisions_total",
        "Routing decisions made, by the state entered"
    );
    describe_counter!(
        "voicemail_notifications_total",
        "Voicemail notification emails, by outcome"
    );
    describe_histogram!(
        "recording_fetch_attempts",
        "Requests needed to download a finished recording"
    );

    Ok(handle)
}

/// HTTP metrics handler
pub async fn metrics_handler(State(prometheus_handle): State<PrometheusHandle>) -> Response {
    (StatusCode::OK, prometheus_handle.render()).into_response()
}
