//! HTTP API: provider webhooks, health and metrics

pub mod health_handler;
pub mod metrics_handler;
pub mod router;
pub mod webhook_dto;
pub mod webhook_handler;

pub use metrics_handler::init_metrics;
pub use router::build_router;
pub use webhook_handler::AppState;
