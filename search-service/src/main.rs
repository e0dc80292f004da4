use search_service::config::SearchConfig;
use search_service::startup::Application;
use service_core::observability::{init_metrics, init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_metrics().map_err(|e| std::io::Error::other(e.to_string()))?;

    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("search-service", "info", otlp_endpoint.as_deref())
        .map_err(|e| std::io::Error::other(format!("Tracing initialization error: {}", e)))?;

    let config = SearchConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start search-service: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    let result = app.run_until_stopped().await;
    shutdown_tracing();
    result
}
