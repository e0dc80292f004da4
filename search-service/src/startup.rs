use crate::config::SearchConfig;
use crate::handlers;
use crate::services::{ElasticsearchClient, SearchBackend};
use axum::{middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use service_core::shutdown::shutdown_signal;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<dyn SearchBackend>,
    pub bucket_size: u32,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/products", get(handlers::search_products))
        .route("/products/", get(handlers::search_products))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// The search backend is only probed, not required, at startup: an index
    /// that comes up later is picked up on the next request.
    pub async fn build(config: SearchConfig) -> Result<Self, AppError> {
        let client = ElasticsearchClient::new(&config.elasticsearch)?;

        if let Err(e) = client.health_check().await {
            tracing::warn!("Search backend not reachable at startup: {}", e);
        }

        let state = AppState {
            search: Arc::new(client),
            bucket_size: config.bucket_size,
        };
        Self::with_state(config.common.port, state).await
    }

    pub async fn with_state(port: u16, state: AppState) -> Result<Self, AppError> {
        let router = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(shutdown_signal()).await
    }

    pub async fn run_until<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let result = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await;
        tracing::info!("search-service stopped");
        result
    }
}
