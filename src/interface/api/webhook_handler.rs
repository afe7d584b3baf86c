//! Webhook handlers
//!
//! One handler per provider callback route. Each answers with exactly one
//! TwiML document (or the bare acknowledgement for recording status), no
//! matter what the request looked like.

use super::webhook_dto::{
    DialStatusRequest, OutboundRequest, RecordingRequest, RecordingStatusRequest, VoiceRequest,
};
use crate::application::notification::{NotificationDispatcher, NotificationOutcome};
use crate::config::{Config, DeliveryMode};
use crate::domain::call::{CallDirection, CallEvent, DialOutcome};
use crate::domain::routing::{CallRouter, CallbackRoute, Markup, RoutingDecision};
use crate::domain::voicemail::{CallMeta, RecordingAsset};
use crate::infrastructure::twiml::{self, FALLBACK_TWIML, TWIML_CONTENT_TYPE};
use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub router: Arc<CallRouter>,
    pub dispatcher: Arc<NotificationDispatcher>,
}

/// Inbound call
pub async fn voice_webhook(
    State(state): State<AppState>,
    payload: Result<Form<VoiceRequest>, FormRejection>,
) -> Response {
    let req = accept(CallbackRoute::Voice, payload);

    let mut event = CallEvent::inbound(
        req.from.unwrap_or_default(),
        req.to.unwrap_or_default(),
        req.call_sid.unwrap_or_default(),
    );
    if let Some(direction) = req.direction.as_deref() {
        event.direction = CallDirection::from_provider(direction);
    }

    info!(
        call_sid = %event.call_id,
        from = %event.from,
        to = %event.to,
        direction = ?event.direction,
        "Incoming call"
    );

    let decision = state.router.on_inbound_call(&event, Utc::now());
    respond(&event.call_id, decision)
}

/// Primary group dial finished
pub async fn dial_status_webhook(
    State(state): State<AppState>,
    payload: Result<Form<DialStatusRequest>, FormRejection>,
) -> Response {
    let req = accept(CallbackRoute::DialStatus, payload);
    let outcome = dial_outcome(&req);

    info!(
        call_sid = %outcome.originating_call_id,
        status = %outcome.status,
        raw_status = ?req.dial_call_status,
        duration = outcome.duration_seconds,
        "Primary group dial finished"
    );

    let decision = state.router.on_primary_outcome(&outcome);
    respond(&outcome.originating_call_id, decision)
}

/// Secondary (mobile) dial finished
pub async fn mobile_dial_status_webhook(
    State(state): State<AppState>,
    payload: Result<Form<DialStatusRequest>, FormRejection>,
) -> Response {
    let req = accept(CallbackRoute::MobileDialStatus, payload);
    let outcome = dial_outcome(&req);

    info!(
        call_sid = %outcome.originating_call_id,
        status = %outcome.status,
        raw_status = ?req.dial_call_status,
        duration = outcome.duration_seconds,
        "Secondary dial finished"
    );

    let decision = state.router.on_secondary_outcome(&outcome);
    respond(&outcome.originating_call_id, decision)
}

/// Outbound redirect
pub async fn outbound_webhook(
    State(state): State<AppState>,
    payload: Result<Form<OutboundRequest>, FormRejection>,
) -> Response {
    let req = accept(CallbackRoute::Outbound, payload);
    let call_sid = req.call_sid.unwrap_or_default();

    let decision = state.router.on_outbound_request(req.to.as_deref());
    respond(&call_sid, decision)
}

/// Voicemail recorded: notify, then thank the caller
pub async fn recording_webhook(
    State(state): State<AppState>,
    payload: Result<Form<RecordingRequest>, FormRejection>,
) -> Response {
    let req = accept(CallbackRoute::Recording, payload);
    let call_sid = req.call_sid.clone().unwrap_or_default();

    info!(
        call_sid = %call_sid,
        recording_sid = ?req.recording_sid,
        duration = ?req.recording_duration,
        "Voicemail recorded"
    );

    match recording_asset(&req) {
        Some(asset) => {
            let meta = CallMeta::new(
                req.from.clone().unwrap_or_else(|| "Unknown caller".to_string()),
                call_sid.clone(),
                Utc::now(),
            );
            deliver_notification(&state, meta, asset).await;
        }
        None => warn!(
            call_sid = %call_sid,
            "Recording callback without RecordingSid or RecordingUrl, no notification sent"
        ),
    }

    twiml_response(&state.router.after_voicemail())
}

/// Recording status ping: logged and acknowledged
pub async fn recording_status_webhook(
    payload: Result<Form<RecordingStatusRequest>, FormRejection>,
) -> StatusCode {
    let req = accept(CallbackRoute::RecordingStatus, payload);

    info!(
        call_sid = ?req.call_sid,
        recording_sid = ?req.recording_sid,
        status = ?req.recording_status,
        "Recording status update"
    );

    StatusCode::OK
}

async fn deliver_notification(state: &AppState, meta: CallMeta, asset: RecordingAsset) {
    let call_sid = meta.call_id.clone();
    let task = state.dispatcher.spawn(meta, asset);

    match state.config.notification.delivery {
        DeliveryMode::Await => {
            match task.wait(state.config.notification_timeout()).await {
                NotificationOutcome::Completed(result) if result.success => {}
                NotificationOutcome::Completed(result) => warn!(
                    call_sid = %call_sid,
                    error = ?result.error_detail,
                    code = ?result.error_code,
                    "Voicemail notification not delivered"
                ),
                NotificationOutcome::TimedOut => {}
                NotificationOutcome::Aborted(reason) => {
                    error!(call_sid = %call_sid, %reason, "Voicemail notification aborted")
                }
            }
        }
        DeliveryMode::Detach => task.detach(),
    }
}

/// Form body, or an empty one when the body did not parse
fn accept<T: Default>(route: CallbackRoute, payload: Result<Form<T>, FormRejection>) -> T {
    metrics::counter!("webhook_requests_total", "route" => route.path()).increment(1);

    match payload {
        Ok(Form(req)) => req,
        Err(rejection) => {
            warn!(
                route = route.path(),
                error = %rejection,
                "Unreadable webhook body, routing with empty parameters"
            );
            T::default()
        }
    }
}

fn dial_outcome(req: &DialStatusRequest) -> DialOutcome {
    DialOutcome::from_provider(
        req.dial_call_status.as_deref(),
        req.dial_call_duration.as_deref(),
        req.call_sid.as_deref(),
    )
}

fn recording_asset(req: &RecordingRequest) -> Option<RecordingAsset> {
    let recording_sid = req.recording_sid.as_deref().map(str::trim).unwrap_or("");
    let recording_url = req
        .recording_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());

    if recording_sid.is_empty() && recording_url.is_none() {
        return None;
    }

    let duration = req
        .recording_duration
        .as_deref()
        .and_then(|d| d.trim().parse().ok())
        .unwrap_or(0);

    let asset = RecordingAsset::new(recording_sid, req.call_sid.clone().unwrap_or_default())
        .with_duration(duration);

    Some(match recording_url {
        Some(url) => asset.with_download_uri(url),
        None => asset,
    })
}

fn respond(call_sid: &str, decision: RoutingDecision) -> Response {
    metrics::counter!("routing_decisions_total", "state" => decision.state.name()).increment(1);
    info!(
        call_sid = %call_sid,
        state = %decision.state,
        reason = decision.reason,
        "Routing decision"
    );

    twiml_response(&decision.markup)
}

fn twiml_response(markup: &Markup) -> Response {
    let body = match twiml::render(markup) {
        Ok(xml) => xml,
        Err(e) => {
            error!(error = %e, "Failed to render TwiML, hanging up");
            FALLBACK_TWIML.to_string()
        }
    };

    ([(header::CONTENT_TYPE, TWIML_CONTENT_TYPE)], body).into_response()
}
