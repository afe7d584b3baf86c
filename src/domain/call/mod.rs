//! Call bounded context - the facts a provider callback tells us about a call

pub mod event;
pub mod value_object;

pub use event::{CallEvent, DialOutcome};
pub use value_object::{CallDirection, Destination, DestinationKind, DialStatus};
