//! Ringline - call-routing webhook responder for a small business phone line
//!
//! Answers telephony provider webhooks with TwiML: ring the desk phones,
//! fall back to a mobile, then to voicemail, gated by business hours. Each
//! voicemail is emailed to the office with the recording attached.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use domain::shared::error::DomainError;
pub use domain::shared::result::Result;
