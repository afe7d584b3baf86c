//! Provider callback events
//!
//! Each webhook request carries one of these. They are built per request and
//! dropped once the response markup is produced.

use super::value_object::{CallDirection, DialStatus};
use serde::{Deserialize, Serialize};

/// A call reaching one of our numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEvent {
    pub from: String,
    pub to: String,
    pub call_id: String,
    pub direction: CallDirection,
}

impl CallEvent {
    pub fn inbound(from: impl Into<String>, to: impl Into<String>, call_id: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            call_id: call_id.into(),
            direction: CallDirection::Inbound,
        }
    }
}

/// Outcome of a dial attempt, reported on the dial action callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialOutcome {
    pub status: DialStatus,
    pub duration_seconds: u32,
    pub originating_call_id: String,
}

impl DialOutcome {
    pub fn new(status: DialStatus, duration_seconds: u32, originating_call_id: impl Into<String>) -> Self {
        Self {
            status,
            duration_seconds,
            originating_call_id: originating_call_id.into(),
        }
    }

    /// Build from raw callback fields. Missing or garbled values degrade to
    /// a failed, zero-length attempt.
    pub fn from_provider(
        status: Option<&str>,
        duration: Option<&str>,
        originating_call_id: Option<&str>,
    ) -> Self {
        Self {
            status: status.map(DialStatus::from_provider).unwrap_or(DialStatus::Failed),
            duration_seconds: duration
                .and_then(|d| d.trim().parse().ok())
                .unwrap_or(0),
            originating_call_id: originating_call_id.unwrap_or_default().to_string(),
        }
    }
}
