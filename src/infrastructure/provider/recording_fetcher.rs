//! Recording Fetcher
//!
//! Pulls voicemail audio from the provider's recording asset endpoint. The
//! provider answers with its structured error document until the recording
//! has been processed, so the fetch polls on a fixed schedule.

use crate::domain::voicemail::{FetchError, FetchedAudio, RecordingAsset, RecordingFetcher};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Provider account credentials, sent as HTTP basic auth
#[derive(Clone)]
pub struct ProviderCredentials {
    pub account_sid: String,
    pub auth_token: String,
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Poll schedule for a recording that is not ready yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Wait before every attempt after the first
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(2),
        }
    }
}

/// Recording fetcher backed by the provider's REST API
pub struct HttpRecordingFetcher {
    client: Client,
    credentials: Option<ProviderCredentials>,
    api_base_url: String,
    format: String,
    policy: RetryPolicy,
}

impl HttpRecordingFetcher {
    pub fn new(
        client: Client,
        credentials: Option<ProviderCredentials>,
        api_base_url: impl Into<String>,
        format: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            client,
            credentials,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            format: format.into(),
            policy,
        }
    }

    /// Where the audio lives in the configured format.
    ///
    /// Prefers the URL from the recording callback; falls back to the
    /// account's recordings collection when only the id is known.
    pub fn asset_url(&self, asset: &RecordingAsset) -> Option<String> {
        if let Some(uri) = asset.download_uri.as_deref().filter(|u| !u.trim().is_empty()) {
            let uri = uri.trim();
            let has_extension = uri
                .rsplit('/')
                .next()
                .map(|last| last.contains('.'))
                .unwrap_or(false);
            return Some(if has_extension {
                uri.to_string()
            } else {
                format!("{}.{}", uri, self.format)
            });
        }

        let account_sid = self.credentials.as_ref()?.account_sid.as_str();
        if asset.recording_id.is_empty() {
            return None;
        }

        Some(format!(
            "{}/2010-04-01/Accounts/{}/Recordings/{}.{}",
            self.api_base_url, account_sid, asset.recording_id, self.format
        ))
    }
}

/// Audio of any encoding counts as the finished recording
fn is_audio(content_type: &str) -> bool {
    content_type.starts_with("audio/")
}

/// The provider's error documents mean "still processing"
fn is_structured_error(content_type: &str) -> bool {
    content_type.starts_with("application/json")
        || content_type.starts_with("application/problem+json")
        || content_type.starts_with("application/xml")
        || content_type.starts_with("text/xml")
}

#[async_trait]
impl RecordingFetcher for HttpRecordingFetcher {
    async fn fetch_audio(&self, asset: &RecordingAsset) -> Result<FetchedAudio, FetchError> {
        let url = self.asset_url(asset).ok_or_else(|| {
            FetchError::TransportError(format!(
                "no download location for recording '{}'",
                asset.recording_id
            ))
        })?;

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.policy.delay).await;
            }

            debug!(recording_id = %asset.recording_id, attempt, "Fetching recording");

            let mut request = self.client.get(&url);
            if let Some(credentials) = &self.credentials {
                request = request.basic_auth(&credentials.account_sid, Some(&credentials.auth_token));
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        recording_id = %asset.recording_id,
                        attempt,
                        error = %e,
                        "Recording request failed, retrying"
                    );
                    continue;
                }
            };

            let status = response.status();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_ascii_lowercase();

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(FetchError::AuthError(format!(
                    "provider answered {} for recording '{}'",
                    status, asset.recording_id
                )));
            }

            if status.is_success() && is_audio(&content_type) {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| FetchError::TransportError(e.to_string()))?;

                metrics::histogram!("recording_fetch_attempts").record(attempt as f64);
                info!(
                    recording_id = %asset.recording_id,
                    attempts = attempt,
                    size = bytes.len(),
                    "Recording fetched"
                );

                return Ok(FetchedAudio {
                    bytes,
                    content_type,
                    attempts: attempt,
                });
            }

            if is_structured_error(&content_type) {
                warn!(
                    recording_id = %asset.recording_id,
                    attempt,
                    %status,
                    "Recording not ready yet, retrying"
                );
            } else {
                warn!(
                    recording_id = %asset.recording_id,
                    attempt,
                    %status,
                    content_type = %content_type,
                    "Unexpected recording response, retrying"
                );
            }
        }

        metrics::histogram!("recording_fetch_attempts").record(self.policy.max_attempts as f64);
        Err(FetchError::NotReady {
            attempts: self.policy.max_attempts,
        })
    }

    fn recording_link(&self, asset: &RecordingAsset) -> String {
        self.asset_url(asset)
            .unwrap_or_else(|| format!("recording {}", asset.recording_id))
    }
}
