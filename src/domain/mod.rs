//! Domain layer - Core call handling rules
//!
//! This layer contains:
//! - Value Objects: phone numbers, SIP URIs, destinations
//! - The business hours calendar
//! - The call routing state machine and its markup
//! - Voicemail and notification models, plus the ports to the provider
//!   asset API and the email transport

pub mod business_hours;
pub mod call;
pub mod notification;
pub mod routing;
pub mod shared;
pub mod voicemail;

// Re-export commonly used types
pub use shared::{DomainError, Result};
