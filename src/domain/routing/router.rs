//! Call Router
//!
//! Turns each provider callback into the next piece of markup. The router
//! holds only static configuration; every decision is rebuilt from the
//! callback parameters, the destination tiers and the current time.

use super::markup::{Dial, DialTarget, Markup, Record};
use super::state::{CallbackRoute, RoutingState};
use crate::domain::business_hours::BusinessHours;
use crate::domain::call::{CallEvent, Destination, DestinationKind, DialOutcome};
use crate::domain::shared::PhoneNumber;
use chrono::{DateTime, Utc};

/// Destination tiers and dialing parameters
#[derive(Debug, Clone)]
pub struct RoutingPlan {
    /// Desk/SIP endpoints rung together first
    pub primary: Vec<Destination>,
    /// Single fallback, usually a mobile
    pub secondary: Option<Destination>,
    /// Ring timeout for outbound redirect calls
    pub outbound_timeout_seconds: u32,
    /// Number presented to dialed parties
    pub caller_id: Option<String>,
    pub default_country_code: String,
}

impl RoutingPlan {
    /// The primary group rings as one dial, bounded by its longest member timeout
    fn primary_timeout_seconds(&self) -> u32 {
        self.primary
            .iter()
            .map(|dest| dest.ring_timeout_seconds)
            .max()
            .unwrap_or(0)
    }
}

/// Voicemail recording parameters
#[derive(Debug, Clone)]
pub struct VoicemailSettings {
    pub max_length_seconds: u32,
    pub finish_on_key: String,
}

impl Default for VoicemailSettings {
    fn default() -> Self {
        Self {
            max_length_seconds: 120,
            finish_on_key: "#".to_string(),
        }
    }
}

/// Everything the caller hears
#[derive(Debug, Clone)]
pub struct Prompts {
    pub greeting: String,
    pub after_hours: String,
    pub secondary_hold: String,
    pub voicemail: String,
    pub closing: String,
    pub invalid_destination: String,
}

impl Prompts {
    pub fn for_business(business_name: &str, hours: &BusinessHours) -> Self {
        Self {
            greeting: format!(
                "Thank you for calling {}. Connecting you now.",
                business_name
            ),
            after_hours: format!(
                "Thank you for calling {}. Our office hours are {}. \
                 Please leave a message after the beep.",
                business_name,
                hours.describe()
            ),
            secondary_hold: "Please continue to hold while we try another line.".to_string(),
            voicemail: "Sorry, no one is available to take your call. \
                        Please leave a message after the beep."
                .to_string(),
            closing: "Thank you for your message. Goodbye.".to_string(),
            invalid_destination: "We are sorry, the number you are trying to reach \
                                  is not valid. Goodbye."
                .to_string(),
        }
    }
}

/// Markup for one callback plus the state it moves the call into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    pub state: RoutingState,
    pub markup: Markup,
    pub reason: &'static str,
}

impl RoutingDecision {
    fn new(state: RoutingState, markup: Markup, reason: &'static str) -> Self {
        Self {
            state,
            markup,
            reason,
        }
    }
}

/// Stateless call routing state machine
#[derive(Debug, Clone)]
pub struct CallRouter {
    hours: BusinessHours,
    plan: RoutingPlan,
    voicemail: VoicemailSettings,
    prompts: Prompts,
    callback_base: Option<String>,
}

impl CallRouter {
    pub fn new(
        hours: BusinessHours,
        plan: RoutingPlan,
        voicemail: VoicemailSettings,
        prompts: Prompts,
    ) -> Self {
        Self {
            hours,
            plan,
            voicemail,
            prompts,
            callback_base: None,
        }
    }

    /// Register callbacks as absolute URLs under `base` instead of bare paths
    pub fn with_callback_base(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.callback_base = Some(base.trim_end_matches('/').to_string());
        self
    }

    pub fn hours(&self) -> &BusinessHours {
        &self.hours
    }

    pub fn plan(&self) -> &RoutingPlan {
        &self.plan
    }

    /// URL the provider should post to for `route`
    pub fn callback_url(&self, route: CallbackRoute) -> String {
        match &self.callback_base {
            Some(base) => format!("{}{}", base, route.path()),
            None => route.path().to_string(),
        }
    }

    /// Start: a new inbound call
    pub fn on_inbound_call(&self, event: &CallEvent, now: DateTime<Utc>) -> RoutingDecision {
        if !self.hours.is_open(now) {
            let markup = self.voicemail_markup(Markup::new().say(&self.prompts.after_hours));
            return RoutingDecision::new(RoutingState::Voicemail, markup, "after hours");
        }

        if self.plan.primary.is_empty() {
            let greeting = Markup::new().say(&self.prompts.greeting);
            return self.ring_secondary(greeting, "no primary destinations configured");
        }

        tracing::debug!(
            call_id = %event.call_id,
            targets = self.plan.primary.len(),
            "Ringing primary group"
        );

        let dial = Dial {
            targets: self.plan.primary.iter().map(dial_target).collect(),
            timeout_seconds: self.plan.primary_timeout_seconds(),
            caller_id: self.plan.caller_id.clone(),
            action: Some(self.callback_url(CallbackRoute::DialStatus)),
        };

        RoutingDecision::new(
            RoutingState::RingPrimaryGroup,
            Markup::new().say(&self.prompts.greeting).dial(dial),
            "business hours",
        )
    }

    /// RingPrimaryGroup: the desk phones stopped ringing
    pub fn on_primary_outcome(&self, outcome: &DialOutcome) -> RoutingDecision {
        if outcome.status.is_answered() {
            return self.terminal("primary group answered");
        }

        let hold = Markup::new().say(&self.prompts.secondary_hold).pause(1);
        self.ring_secondary(hold, "primary group not answered")
    }

    /// RingSecondary: the mobile stopped ringing
    pub fn on_secondary_outcome(&self, outcome: &DialOutcome) -> RoutingDecision {
        if outcome.status.is_answered() {
            return self.terminal("secondary answered");
        }

        let markup = self.voicemail_markup(Markup::new().say(&self.prompts.voicemail));
        RoutingDecision::new(RoutingState::Voicemail, markup, "secondary not answered")
    }

    /// Outbound redirect: dial an arbitrary address after normalizing it
    pub fn on_outbound_request(&self, raw_destination: Option<&str>) -> RoutingDecision {
        let normalized = raw_destination
            .ok_or_else(|| "missing destination".to_string())
            .and_then(|raw| {
                PhoneNumber::normalize(raw, &self.plan.default_country_code)
                    .map_err(|e| e.to_string())
            });

        match normalized {
            Ok(number) => {
                let dial = Dial {
                    targets: vec![DialTarget::Number(number.to_string())],
                    timeout_seconds: self.plan.outbound_timeout_seconds,
                    caller_id: self.plan.caller_id.clone(),
                    action: None,
                };
                RoutingDecision::new(
                    RoutingState::OutboundDial,
                    Markup::new().dial(dial).hangup(),
                    "outbound destination accepted",
                )
            }
            Err(e) => {
                tracing::warn!(
                    destination = ?raw_destination,
                    error = %e,
                    "Rejecting outbound destination"
                );
                RoutingDecision::new(
                    RoutingState::Terminal,
                    Markup::new().say(&self.prompts.invalid_destination).hangup(),
                    "invalid outbound destination",
                )
            }
        }
    }

    /// Closing markup once the provider reports the voicemail was recorded
    pub fn after_voicemail(&self) -> Markup {
        Markup::new().say(&self.prompts.closing).hangup()
    }

    fn ring_secondary(&self, preamble: Markup, reason: &'static str) -> RoutingDecision {
        let Some(secondary) = &self.plan.secondary else {
            let markup = self.voicemail_markup(preamble.say(&self.prompts.voicemail));
            return RoutingDecision::new(
                RoutingState::Voicemail,
                markup,
                "no secondary destination configured",
            );
        };

        let dial = Dial {
            targets: vec![dial_target(secondary)],
            timeout_seconds: secondary.ring_timeout_seconds,
            caller_id: self.plan.caller_id.clone(),
            action: Some(self.callback_url(CallbackRoute::MobileDialStatus)),
        };

        RoutingDecision::new(RoutingState::RingSecondary, preamble.dial(dial), reason)
    }

    fn voicemail_markup(&self, preamble: Markup) -> Markup {
        preamble
            .record(Record {
                max_length_seconds: self.voicemail.max_length_seconds,
                finish_on_key: self.voicemail.finish_on_key.clone(),
                action: self.callback_url(CallbackRoute::Recording),
                status_callback: Some(self.callback_url(CallbackRoute::RecordingStatus)),
                play_beep: true,
            })
            .hangup()
    }

    fn terminal(&self, reason: &'static str) -> RoutingDecision {
        RoutingDecision::new(RoutingState::Terminal, Markup::new().hangup(), reason)
    }
}

fn dial_target(destination: &Destination) -> DialTarget {
    match &destination.kind {
        DestinationKind::SipEndpoint(uri) => DialTarget::Sip(uri.to_string()),
        DestinationKind::PstnNumber(number) => DialTarget::Number(number.to_string()),
    }
}
