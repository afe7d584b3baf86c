//! Configuration management
//!
//! Built once at startup from defaults, an optional `ringline.toml` and
//! `RINGLINE_*` environment variables, then shared read-only.

use crate::application::notification::NotificationSettings;
use crate::domain::business_hours::BusinessHours;
use crate::domain::call::{Destination, DestinationKind};
use crate::domain::routing::{CallRouter, Prompts, RoutingPlan, VoicemailSettings};
use crate::domain::shared::PhoneNumber;
use crate::infrastructure::provider::{ProviderCredentials, RetryPolicy};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub routing: RoutingConfig,
    pub recording: RecordingConfig,
    pub notification: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Absolute base for callback URLs; relative paths when unset
    pub public_base_url: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub api_base_url: String,
    pub recording_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub time_zone: String,
    pub open_hour: u32,
    pub close_hour: u32,
    pub primary_destinations: Vec<String>,
    pub secondary_destination: Option<String>,
    pub caller_id: Option<String>,
    pub default_country_code: String,
    pub primary_timeout_secs: u32,
    pub secondary_timeout_secs: u32,
    pub outbound_timeout_secs: u32,
    pub business_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub max_length_secs: u32,
    pub finish_on_key: String,
    pub fetch_max_attempts: u32,
    pub fetch_retry_delay_ms: u64,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub api_key: Option<String>,
    pub sender: Option<String>,
    pub sender_name: Option<String>,
    pub recipients: Vec<String>,
    pub api_base_url: String,
    pub delivery: DeliveryMode,
    pub await_timeout_secs: u64,
}

/// How `/webhook/recording` treats the notification task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Wait for the email, bounded by `await_timeout_secs`
    #[default]
    Await,
    /// Best-effort, answer the provider right away
    Detach,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_base_url: None,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            api_base_url: "https://api.twilio.com".to_string(),
            recording_format: "mp3".to_string(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            time_zone: "America/New_York".to_string(),
            open_hour: 8,
            close_hour: 17,
            primary_destinations: Vec::new(),
            secondary_destination: None,
            caller_id: None,
            default_country_code: "1".to_string(),
            primary_timeout_secs: 20,
            secondary_timeout_secs: 15,
            outbound_timeout_secs: 30,
            business_name: "our office".to_string(),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_length_secs: 120,
            finish_on_key: "#".to_string(),
            fetch_max_attempts: 5,
            fetch_retry_delay_ms: 2000,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            sender: None,
            sender_name: None,
            recipients: Vec::new(),
            api_base_url: "https://api.sendgrid.com".to_string(),
            delivery: DeliveryMode::Await,
            await_timeout_secs: 12,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &redacted(&self.auth_token))
            .field("api_base_url", &self.api_base_url)
            .field("recording_format", &self.recording_format)
            .finish()
    }
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("api_key", &redacted(&self.api_key))
            .field("sender", &self.sender)
            .field("sender_name", &self.sender_name)
            .field("recipients", &self.recipients)
            .field("api_base_url", &self.api_base_url)
            .field("delivery", &self.delivery)
            .field("await_timeout_secs", &self.await_timeout_secs)
            .finish()
    }
}

fn redacted(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

fn is_country_code(code: &str) -> bool {
    (1..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_digit())
}

/// `Some` only for a value with something in it
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Config {
    /// Load from `ringline.toml` (optional) and `RINGLINE_*` variables, then validate
    pub fn load() -> Result<Self, ConfigError> {
        let builder = ::config::Config::builder()
            .add_source(::config::File::with_name("ringline").required(false))
            .add_source(
                ::config::Environment::with_prefix("RINGLINE")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("routing.primary_destinations")
                    .with_list_parse_key("notification.recipients")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    /// Load from TOML text alone
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let builder = ::config::Config::builder()
            .add_source(::config::File::from_str(text, ::config::FileFormat::Toml));

        Self::from_builder(builder)
    }

    fn from_builder(
        builder: ::config::ConfigBuilder<::config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check every setting that does not depend on a credential
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must not be 0".to_string()));
        }

        let routing = &self.routing;
        for (name, value) in [
            ("routing.primary_timeout_secs", routing.primary_timeout_secs),
            ("routing.secondary_timeout_secs", routing.secondary_timeout_secs),
            ("routing.outbound_timeout_secs", routing.outbound_timeout_secs),
            ("recording.max_length_secs", self.recording.max_length_secs),
            ("recording.fetch_max_attempts", self.recording.fetch_max_attempts),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be greater than 0", name)));
            }
        }

        if self.notification.await_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "notification.await_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(bad) = self
            .notification
            .recipients
            .iter()
            .find(|address| !address.contains('@'))
        {
            return Err(ConfigError::Invalid(format!(
                "notification recipient '{}' is not an email address",
                bad
            )));
        }

        if let Some(sender) = non_blank(&self.notification.sender) {
            if !sender.contains('@') {
                return Err(ConfigError::Invalid(format!(
                    "notification sender '{}' is not an email address",
                    sender
                )));
            }
        }

        self.business_hours()?;
        self.routing_plan()?;
        Ok(())
    }

    /// Settings the deployment still lacks; the service runs degraded without them
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if non_blank(&self.provider.account_sid).is_none() {
            missing.push("provider account sid");
        }
        if non_blank(&self.provider.auth_token).is_none() {
            missing.push("provider auth token");
        }
        if non_blank(&self.notification.api_key).is_none() {
            missing.push("email API key");
        }
        if non_blank(&self.notification.sender).is_none() {
            missing.push("sender address");
        }
        if self.notification.recipients.is_empty() {
            missing.push("recipient addresses");
        }
        missing
    }

    pub fn has_provider_credentials(&self) -> bool {
        self.provider_credentials().is_some()
    }

    pub fn has_transport_credentials(&self) -> bool {
        non_blank(&self.notification.api_key).is_some()
    }

    pub fn time_zone(&self) -> Result<Tz, ConfigError> {
        BusinessHours::parse_time_zone(&self.routing.time_zone)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn business_hours(&self) -> Result<BusinessHours, ConfigError> {
        BusinessHours::new(
            self.time_zone()?,
            self.routing.open_hour,
            self.routing.close_hour,
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn routing_plan(&self) -> Result<RoutingPlan, ConfigError> {
        let routing = &self.routing;
        let country_code = routing.default_country_code.as_str();
        if !is_country_code(country_code) {
            return Err(ConfigError::Invalid(format!(
                "routing.default_country_code '{}' must be 1 to 3 digits without '+'",
                country_code
            )));
        }

        let primary = routing
            .primary_destinations
            .iter()
            .map(|address| address.trim())
            .filter(|address| !address.is_empty())
            .map(|address| Destination::parse(address, routing.primary_timeout_secs, country_code))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::Invalid(format!("routing.primary_destinations: {}", e)))?;

        // One <Dial> cannot ring <Sip> together with other nouns
        let sip_count = primary
            .iter()
            .filter(|dest| matches!(dest.kind, DestinationKind::SipEndpoint(_)))
            .count();
        if sip_count > 0 && sip_count < primary.len() {
            return Err(ConfigError::Invalid(
                "routing.primary_destinations mixes SIP endpoints and phone numbers".to_string(),
            ));
        }

        let secondary = non_blank(&routing.secondary_destination)
            .map(|address| Destination::parse(address, routing.secondary_timeout_secs, country_code))
            .transpose()
            .map_err(|e| ConfigError::Invalid(format!("routing.secondary_destination: {}", e)))?;

        let caller_id = non_blank(&routing.caller_id)
            .map(|number| PhoneNumber::normalize(number, country_code))
            .transpose()
            .map_err(|e| ConfigError::Invalid(format!("routing.caller_id: {}", e)))?
            .map(|number| number.to_string());

        Ok(RoutingPlan {
            primary,
            secondary,
            outbound_timeout_seconds: routing.outbound_timeout_secs,
            caller_id,
            default_country_code: routing.default_country_code.clone(),
        })
    }

    pub fn voicemail_settings(&self) -> VoicemailSettings {
        VoicemailSettings {
            max_length_seconds: self.recording.max_length_secs,
            finish_on_key: self.recording.finish_on_key.clone(),
        }
    }

    /// Router wired with hours, destinations, prompts and callback base
    pub fn call_router(&self) -> Result<CallRouter, ConfigError> {
        let hours = self.business_hours()?;
        let prompts = Prompts::for_business(&self.routing.business_name, &hours);
        let router = CallRouter::new(
            hours,
            self.routing_plan()?,
            self.voicemail_settings(),
            prompts,
        );

        Ok(match non_blank(&self.server.public_base_url) {
            Some(base) => router.with_callback_base(base),
            None => router,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.recording.fetch_max_attempts,
            delay: Duration::from_millis(self.recording.fetch_retry_delay_ms),
        }
    }

    pub fn provider_credentials(&self) -> Option<ProviderCredentials> {
        match (
            non_blank(&self.provider.account_sid),
            non_blank(&self.provider.auth_token),
        ) {
            (Some(account_sid), Some(auth_token)) => Some(ProviderCredentials {
                account_sid: account_sid.to_string(),
                auth_token: auth_token.to_string(),
            }),
            _ => None,
        }
    }

    pub fn email_api_key(&self) -> Option<String> {
        non_blank(&self.notification.api_key).map(str::to_string)
    }

    pub fn notification_settings(&self) -> Result<NotificationSettings, ConfigError> {
        Ok(NotificationSettings {
            sender: non_blank(&self.notification.sender).map(str::to_string),
            sender_name: non_blank(&self.notification.sender_name).map(str::to_string),
            recipients: self.notification.recipients.clone(),
            time_zone: self.time_zone()?,
        })
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification.await_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
