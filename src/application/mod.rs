//! Application layer - Use cases and application services
//!
//! This layer orchestrates domain objects to fulfill use cases.
//! It's responsible for:
//! - Coordinating the recording fetch and the email transport
//! - Turning internal failures into reportable results
//! - Running notifications as explicit tasks

pub mod notification;
