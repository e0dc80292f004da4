#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use search_service::services::MockSearchBackend;
use search_service::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const BUCKET_SIZE: u32 = 25;

pub struct TestApp {
    pub router: Router,
    pub backend: Arc<MockSearchBackend>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_backend(MockSearchBackend::with_buckets(
            10,
            &[("female", 6), ("male", 4)],
            &[("18-24", 7), ("25-34", 3)],
        ))
    }

    pub fn with_backend(backend: MockSearchBackend) -> Self {
        let backend = Arc::new(backend);
        let router = build_router(AppState {
            search: backend.clone(),
            bucket_size: BUCKET_SIZE,
        });
        Self { router, backend }
    }

    pub async fn get(&self, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response was not JSON")
        };
        (status, value)
    }
}
