//! Notification Dispatcher
//!
//! Emails a voicemail to the configured recipients: check the transport
//! settings, fetch the audio, compose, send, and report the outcome as a
//! `NotificationResult`. Nothing in here fails the call that left the message.

use super::message::{compose, Envelope, RecordingDelivery};
use super::task::NotificationTask;
use crate::domain::notification::{EmailTransport, NotificationResult, TransportError};
use crate::domain::voicemail::{CallMeta, RecordingAsset, RecordingFetcher};
use chrono_tz::Tz;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

/// Sender identity and recipients for voicemail emails
#[derive(Debug, Clone)]
pub struct NotificationSettings {
    pub sender: Option<String>,
    pub sender_name: Option<String>,
    pub recipients: Vec<String>,
    /// Zone the receive time is shown in
    pub time_zone: Tz,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Configuration error: missing {}", .0.join(", "))]
    Configuration(Vec<&'static str>),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl NotificationError {
    fn error_code(&self) -> Option<u16> {
        match self {
            NotificationError::Transport(e) => e.status_code(),
            NotificationError::Configuration(_) => None,
        }
    }
}

pub struct NotificationDispatcher {
    fetcher: Arc<dyn RecordingFetcher>,
    transport: Arc<dyn EmailTransport>,
    settings: NotificationSettings,
}

impl NotificationDispatcher {
    pub fn new(
        fetcher: Arc<dyn RecordingFetcher>,
        transport: Arc<dyn EmailTransport>,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            fetcher,
            transport,
            settings,
        }
    }

    /// Names of the transport settings that are absent
    pub fn missing_configuration(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.transport.is_configured() {
            missing.push("email API key");
        }
        if self.settings.sender.is_none() {
            missing.push("sender address");
        }
        if self.settings.recipients.is_empty() {
            missing.push("recipient addresses");
        }
        missing
    }

    /// Email the voicemail and report what happened
    pub async fn notify(&self, meta: &CallMeta, asset: &RecordingAsset) -> NotificationResult {
        match self.try_notify(meta, asset).await {
            Ok(result) => {
                metrics::counter!("voicemail_notifications_total", "outcome" => "sent")
                    .increment(1);
                info!(
                    call_id = %meta.call_id,
                    recording_id = %asset.recording_id,
                    message_id = ?result.message_id,
                    attached = result.recording_attached,
                    "Voicemail notification sent"
                );
                result
            }
            Err(e) => {
                metrics::counter!("voicemail_notifications_total", "outcome" => "failed")
                    .increment(1);
                error!(
                    call_id = %meta.call_id,
                    recording_id = %asset.recording_id,
                    error = %e,
                    "Voicemail notification failed"
                );
                NotificationResult::failed(e.to_string(), e.error_code())
            }
        }
    }

    /// Run `notify` as its own task. The caller decides to await or detach it.
    pub fn spawn(self: &Arc<Self>, meta: CallMeta, asset: RecordingAsset) -> NotificationTask {
        let id = Uuid::new_v4();
        let dispatcher = Arc::clone(self);
        let span = tracing::info_span!("notification", %id, call_id = %meta.call_id);

        let handle = tokio::spawn(
            async move { dispatcher.notify(&meta, &asset).await }.instrument(span),
        );

        NotificationTask::new(id, handle)
    }

    async fn try_notify(
        &self,
        meta: &CallMeta,
        asset: &RecordingAsset,
    ) -> Result<NotificationResult, NotificationError> {
        let missing = self.missing_configuration();
        let sender = match self.settings.sender.as_deref() {
            Some(sender) if missing.is_empty() => sender,
            _ => return Err(NotificationError::Configuration(missing)),
        };

        let envelope = Envelope {
            sender,
            sender_name: self.settings.sender_name.as_deref(),
            recipients: &self.settings.recipients,
            time_zone: self.settings.time_zone,
        };

        let audio = match self.fetcher.fetch_audio(asset).await {
            Ok(audio) => Some(audio),
            Err(e) => {
                warn!(
                    recording_id = %asset.recording_id,
                    error = %e,
                    "Recording unavailable, sending link instead"
                );
                None
            }
        };

        let link;
        let delivery = match &audio {
            Some(audio) => RecordingDelivery::Attached(audio),
            None => {
                link = self.fetcher.recording_link(asset);
                RecordingDelivery::Link(&link)
            }
        };

        let message = compose(&envelope, meta, asset, delivery);
        let message_id = self.transport.send(&message).await?;

        Ok(NotificationResult::sent(message_id, audio.is_some()))
    }
}
