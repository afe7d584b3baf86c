//! SendGrid v3 mail send transport
//!
//! Posts JSON to `/v3/mail/send` with a bearer API key. SendGrid answers
//! `202 Accepted` with the message id in the `X-Message-Id` header; errors
//! come back as `{"errors": [{"message": ...}]}`.

use crate::domain::notification::{EmailMessage, EmailTransport, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default SendGrid API base
pub const DEFAULT_SENDGRID_URL: &str = "https://api.sendgrid.com";

#[derive(Debug, Serialize)]
struct MailSendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<Attachment<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct Attachment<'a> {
    content: &'a str,
    #[serde(rename = "type")]
    content_type: &'a str,
    filename: &'a str,
    disposition: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    message: String,
}

pub struct SendGridTransport {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl SendGridTransport {
    pub fn new(client: Client, api_key: Option<String>, api_base_url: Option<&str>) -> Self {
        let base = api_base_url.unwrap_or(DEFAULT_SENDGRID_URL).trim_end_matches('/');
        Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            endpoint: format!("{}/v3/mail/send", base),
        }
    }

    fn build_request_body<'a>(&self, message: &'a EmailMessage) -> MailSendRequest<'a> {
        MailSendRequest {
            personalizations: vec![Personalization {
                to: message
                    .to
                    .iter()
                    .map(|email| Address {
                        email: email.as_str(),
                        name: None,
                    })
                    .collect(),
            }],
            from: Address {
                email: &message.from,
                name: message.from_name.as_deref(),
            },
            subject: &message.subject,
            content: vec![Content {
                content_type: "text/plain",
                value: &message.body,
            }],
            attachments: message
                .attachments
                .iter()
                .map(|attachment| Attachment {
                    content: &attachment.content_base64,
                    content_type: &attachment.content_type,
                    filename: &attachment.filename,
                    disposition: "attachment",
                })
                .collect(),
        }
    }
}

#[async_trait]
impl EmailTransport for SendGridTransport {
    async fn send(&self, message: &EmailMessage) -> Result<String, TransportError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(TransportError::MissingCredentials)?;

        let body = self.build_request_body(message);

        debug!(
            endpoint = %self.endpoint,
            recipients = message.to.len(),
            attachments = message.attachments.len(),
            "Sending email"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let parsed: ErrorResponse = serde_json::from_str(&text).unwrap_or_default();
            let detail = if parsed.errors.is_empty() {
                text
            } else {
                parsed
                    .errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; ")
            };

            return Err(TransportError::Provider {
                status: status.as_u16(),
                detail,
            });
        }

        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| format!("accepted-{}", uuid::Uuid::new_v4()));

        Ok(message_id)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
