//! Routing states and the callback routes that move a call between them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a call sits in the ring-desk / ring-mobile / voicemail sequence.
///
/// Nothing stores this between requests: each callback route implies the
/// state it resumes from, and the response names the state it moves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoutingState {
    Start,
    RingPrimaryGroup,
    RingSecondary,
    Voicemail,
    /// Outbound redirect placed a call
    OutboundDial,
    Terminal,
}

impl RoutingState {
    pub fn name(&self) -> &'static str {
        match self {
            RoutingState::Start => "start",
            RoutingState::RingPrimaryGroup => "ring_primary_group",
            RoutingState::RingSecondary => "ring_secondary",
            RoutingState::Voicemail => "voicemail",
            RoutingState::OutboundDial => "outbound_dial",
            RoutingState::Terminal => "terminal",
        }
    }
}

impl fmt::Display for RoutingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Webhook routes the provider calls us on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackRoute {
    Voice,
    DialStatus,
    MobileDialStatus,
    Outbound,
    Recording,
    RecordingStatus,
}

impl CallbackRoute {
    pub const ALL: [CallbackRoute; 6] = [
        CallbackRoute::Voice,
        CallbackRoute::DialStatus,
        CallbackRoute::MobileDialStatus,
        CallbackRoute::Outbound,
        CallbackRoute::Recording,
        CallbackRoute::RecordingStatus,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            CallbackRoute::Voice => "/webhook/voice",
            CallbackRoute::DialStatus => "/webhook/dial-status",
            CallbackRoute::MobileDialStatus => "/webhook/mobile-dial-status",
            CallbackRoute::Outbound => "/webhook/outbound",
            CallbackRoute::Recording => "/webhook/recording",
            CallbackRoute::RecordingStatus => "/webhook/recording-status",
        }
    }
}
