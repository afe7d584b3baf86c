//! Health check handler

use super::webhook_dto::HealthResponse;
use super::webhook_handler::AppState;
use axum::{extract::State, Json};
use chrono::Utc;

/// Liveness plus which credentials the deployment is still missing
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let missing: Vec<String> = state
        .config
        .missing_credentials()
        .into_iter()
        .map(str::to_string)
        .collect();

    Json(HealthResponse {
        status: if missing.is_empty() { "ok" } else { "degraded" }.to_string(),
        open_now: state.router.hours().is_open(Utc::now()),
        provider_credentials: state.config.has_provider_credentials(),
        transport_credentials: state.config.has_transport_credentials(),
        missing,
    })
}
