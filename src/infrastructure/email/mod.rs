//! Outbound email transport

pub mod sendgrid;

pub use sendgrid::SendGridTransport;
