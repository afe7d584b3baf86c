use ringline::application::notification::NotificationDispatcher;
use ringline::config::Config;
use ringline::infrastructure::email::SendGridTransport;
use ringline::infrastructure::provider::HttpRecordingFetcher;
use ringline::interface::api::{build_router, init_metrics, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ringline=info,tower_http=info")),
        )
        .init();

    info!("Starting Ringline webhook responder");

    // Load configuration
    let config = Arc::new(Config::load()?);
    info!("Configuration loaded: {:?}", config);

    let missing = config.missing_credentials();
    if !missing.is_empty() {
        warn!(
            missing = %missing.join(", "),
            "Running without some credentials; voicemail emails may fail"
        );
    }

    let router = Arc::new(config.call_router()?);
    info!(
        hours = %router.hours().describe(),
        primary = router.plan().primary.len(),
        secondary = router.plan().secondary.is_some(),
        "Call routing ready"
    );

    // Shared HTTP client for the provider and email APIs
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let fetcher = Arc::new(HttpRecordingFetcher::new(
        http.clone(),
        config.provider_credentials(),
        config.provider.api_base_url.clone(),
        config.provider.recording_format.clone(),
        config.retry_policy(),
    ));
    let transport = Arc::new(SendGridTransport::new(
        http,
        config.email_api_key(),
        Some(config.notification.api_base_url.as_str()),
    ));
    let dispatcher = Arc::new(NotificationDispatcher::new(
        fetcher,
        transport,
        config.notification_settings()?,
    ));

    info!("Initializing Prometheus metrics exporter");
    let prometheus_handle = init_metrics()?;

    let state = AppState {
        config: Arc::clone(&config),
        router,
        dispatcher,
    };
    let app = build_router(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("Webhook server listening on {}", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
