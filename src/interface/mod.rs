//! Interface layer - the HTTP surface the telephony provider talks to

pub mod api;
