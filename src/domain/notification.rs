//! Voicemail notification model and the email transport port

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of one notification attempt; returned to the caller, never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error_detail: Option<String>,
    /// Provider error code, when the provider gave one
    pub error_code: Option<u16>,
    pub recording_attached: bool,
}

impl NotificationResult {
    pub fn sent(message_id: impl Into<String>, recording_attached: bool) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error_detail: None,
            error_code: None,
            recording_attached,
        }
    }

    pub fn failed(detail: impl Into<String>, error_code: Option<u16>) -> Self {
        Self {
            success: false,
            message_id: None,
            error_detail: Some(detail.into()),
            error_code,
            recording_attached: false,
        }
    }
}

/// File attached to an outgoing email, already base64 encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content_base64: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub from_name: Option<String>,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Email transport is missing credentials")]
    MissingCredentials,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Provider rejected message ({status}): {detail}")]
    Provider { status: u16, detail: String },
}

impl TransportError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Port to the outbound email provider
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EmailTransport: Send + Sync {
    /// Submit a message, returning the provider-assigned message id
    async fn send(&self, message: &EmailMessage) -> Result<String, TransportError>;

    /// Whether the transport has the credentials it needs to send
    fn is_configured(&self) -> bool;
}
