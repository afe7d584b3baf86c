//! Infrastructure layer - Adapters to the outside world
//!
//! This layer contains:
//! - TwiML rendering of routing markup
//! - The provider's recording asset API client
//! - The outbound email transport

pub mod email;
pub mod provider;
pub mod twiml;
