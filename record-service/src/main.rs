use record_service::config::RecordConfig;
use record_service::startup::Application;
use service_core::observability::{init_metrics, init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics().map_err(|e| std::io::Error::other(e.to_string()))?;

    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("record-service", "info", otlp_endpoint.as_deref())
        .map_err(|e| std::io::Error::other(format!("Tracing initialization error: {}", e)))?;

    let config = RecordConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start record-service: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    let result = app.run_until_stopped().await;
    shutdown_tracing();
    result
}
