//! Routing bounded context - the ring desk / ring mobile / voicemail state machine

pub mod markup;
pub mod router;
pub mod state;

pub use markup::{Dial, DialTarget, Markup, Record, Verb};
pub use router::{CallRouter, Prompts, RoutingDecision, RoutingPlan, VoicemailSettings};
pub use state::{CallbackRoute, RoutingState};
