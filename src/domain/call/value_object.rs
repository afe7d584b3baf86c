//! Call value objects

use crate::domain::shared::{DomainError, PhoneNumber, Result, SipUri};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Call direction as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallDirection {
    Inbound,
    Outbound,
}

impl CallDirection {
    /// Parse the provider's `Direction` field (`inbound`, `outbound-api`, `outbound-dial`)
    pub fn from_provider(value: &str) -> Self {
        if value.trim().to_ascii_lowercase().starts_with("outbound") {
            CallDirection::Outbound
        } else {
            CallDirection::Inbound
        }
    }
}

/// Result of a ring-and-connect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialStatus {
    Answered,
    NoAnswer,
    Busy,
    Failed,
}

impl DialStatus {
    /// Parse the provider's `DialCallStatus` field.
    ///
    /// `completed` means the dialed party picked up and has since hung up.
    /// Anything unrecognised, `canceled` included, is a failure so the caller
    /// moves on to the next fallback instead of being dropped.
    pub fn from_provider(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "answered" | "completed" | "in-progress" => DialStatus::Answered,
            "no-answer" => DialStatus::NoAnswer,
            "busy" => DialStatus::Busy,
            _ => DialStatus::Failed,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, DialStatus::Answered)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DialStatus::Answered => "answered",
            DialStatus::NoAnswer => "no-answer",
            DialStatus::Busy => "busy",
            DialStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of target a destination rings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestinationKind {
    /// Desk phone or softphone registered on a SIP domain
    SipEndpoint(SipUri),
    /// Number on the public phone network
    PstnNumber(PhoneNumber),
}

/// One entry of a destination tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub kind: DestinationKind,
    pub ring_timeout_seconds: u32,
}

impl Destination {
    /// Parse a configured address. `sip:`/`sips:` addresses are SIP endpoints,
    /// everything else must normalize to a phone number.
    pub fn parse(
        address: &str,
        ring_timeout_seconds: u32,
        default_country_code: &str,
    ) -> Result<Self> {
        if ring_timeout_seconds == 0 {
            return Err(DomainError::ValidationError(format!(
                "ring timeout for {} must be greater than zero",
                address
            )));
        }

        let trimmed = address.trim();
        let lower = trimmed.to_ascii_lowercase();
        let kind = if lower.starts_with("sip:") || lower.starts_with("sips:") {
            DestinationKind::SipEndpoint(SipUri::parse(trimmed)?)
        } else {
            DestinationKind::PstnNumber(PhoneNumber::normalize(trimmed, default_country_code)?)
        };

        Ok(Self {
            kind,
            ring_timeout_seconds,
        })
    }

    /// Address as handed to the provider
    pub fn address(&self) -> String {
        match &self.kind {
            DestinationKind::SipEndpoint(uri) => uri.to_string(),
            DestinationKind::PstnNumber(number) => number.to_string(),
        }
    }
}
