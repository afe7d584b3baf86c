//! Voicemail notification use case

pub mod dispatcher;
pub mod message;
pub mod task;

pub use dispatcher::{NotificationDispatcher, NotificationError, NotificationSettings};
pub use task::{NotificationOutcome, NotificationTask};
