//! Webhook DTOs (provider callback form bodies)
//!
//! Every field is optional: a callback with missing or unexpected fields
//! still gets routed, never rejected.

use serde::{Deserialize, Serialize};

/// Inbound call, posted to `/webhook/voice`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VoiceRequest {
    pub call_sid: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub direction: Option<String>,
}

/// Dial action callback, posted to `/webhook/dial-status` and `/webhook/mobile-dial-status`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DialStatusRequest {
    pub call_sid: Option<String>,
    pub dial_call_status: Option<String>,
    pub dial_call_duration: Option<String>,
    pub to: Option<String>,
}

/// Outbound redirect, posted to `/webhook/outbound`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutboundRequest {
    pub call_sid: Option<String>,
    pub to: Option<String>,
}

/// Record action callback, posted to `/webhook/recording`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordingRequest {
    pub call_sid: Option<String>,
    pub from: Option<String>,
    pub recording_sid: Option<String>,
    pub recording_url: Option<String>,
    pub recording_duration: Option<String>,
}

/// Recording status ping, posted to `/webhook/recording-status`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordingStatusRequest {
    pub call_sid: Option<String>,
    pub recording_sid: Option<String>,
    pub recording_status: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub open_now: bool,
    pub provider_credentials: bool,
    pub transport_credentials: bool,
    pub missing: Vec<String>,
}
