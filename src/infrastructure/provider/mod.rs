//! Telephony provider HTTP APIs

pub mod recording_fetcher;

pub use recording_fetcher::{HttpRecordingFetcher, ProviderCredentials, RetryPolicy};
