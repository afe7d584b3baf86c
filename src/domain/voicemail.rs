//! Voicemail domain model

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recording the provider produced from a record instruction.
///
/// The provider owns the audio; we only hold a reference to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingAsset {
    pub recording_id: String,
    pub source_call_id: String,
    pub duration_seconds: u32,
    /// Provider URL of the recording, without a format extension
    pub download_uri: Option<String>,
}

impl RecordingAsset {
    pub fn new(recording_id: impl Into<String>, source_call_id: impl Into<String>) -> Self {
        Self {
            recording_id: recording_id.into(),
            source_call_id: source_call_id.into(),
            duration_seconds: 0,
            download_uri: None,
        }
    }

    pub fn with_duration(mut self, duration_seconds: u32) -> Self {
        self.duration_seconds = duration_seconds;
        self
    }

    pub fn with_download_uri(mut self, uri: impl Into<String>) -> Self {
        self.download_uri = Some(uri.into());
        self
    }
}

/// Who left the message and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMeta {
    pub caller: String,
    pub call_id: String,
    pub received_at: DateTime<Utc>,
}

impl CallMeta {
    pub fn new(caller: impl Into<String>, call_id: impl Into<String>, received_at: DateTime<Utc>) -> Self {
        Self {
            caller: caller.into(),
            call_id: call_id.into(),
            received_at,
        }
    }
}

/// Audio bytes pulled from the provider
#[derive(Debug, Clone)]
pub struct FetchedAudio {
    pub bytes: Bytes,
    pub content_type: String,
    /// Requests it took, the successful one included
    pub attempts: u32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Recording not ready after {attempts} attempts")]
    NotReady { attempts: u32 },

    #[error("Recording access denied: {0}")]
    AuthError(String),

    #[error("Recording transport error: {0}")]
    TransportError(String),
}

/// Port to the provider's recording asset API
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecordingFetcher: Send + Sync {
    /// Download the audio, retrying while the provider is still processing it
    async fn fetch_audio(&self, asset: &RecordingAsset) -> Result<FetchedAudio, FetchError>;

    /// Public link to the recording for when the audio cannot be attached
    fn recording_link(&self, asset: &RecordingAsset) -> String;
}
