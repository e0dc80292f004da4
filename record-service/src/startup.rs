use crate::config::RecordConfig;
use crate::handlers;
use crate::services::{MongoDb, RecordRepository};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
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
    pub repo: Arc<dyn RecordRepository>,
}

impl AppState {
    pub fn new(repo: Arc<dyn RecordRepository>) -> Self {
        Self { repo }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/data",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route("/data/_bulk", post(handlers::bulk_create_records))
        .route(
            "/data/:id",
            get(handlers::get_record)
                .put(handlers::update_record)
                .delete(handlers::delete_record),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .nest("/api/v1", api)
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    repo: Arc<dyn RecordRepository>,
}

impl Application {
    /// Connects to MongoDB and fails fast if it does not answer a ping.
    pub async fn build(config: RecordConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(
            &config.mongodb.uri,
            &config.mongodb.database,
            &config.mongodb.collection,
        )
        .await?;

        db.health_check().await.map_err(|e| {
            tracing::error!("MongoDB did not answer ping at startup: {}", e);
            e
        })?;

        Self::with_repository(config.common.port, Arc::new(db)).await
    }

    pub async fn with_repository(
        port: u16,
        repo: Arc<dyn RecordRepository>,
    ) -> Result<Self, AppError> {
        let router = build_router(AppState::new(repo.clone()));

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
            repo,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serves until `signal` resolves, then closes the backend connection.
    pub async fn run_until<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let result = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await;

        self.repo.shutdown().await;
        tracing::info!("record-service stopped");
        result
    }
}
