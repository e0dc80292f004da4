#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use record_service::services::InMemoryRecordRepository;
use record_service::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<InMemoryRecordRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryRecordRepository::new());
        let router = build_router(AppState::new(repo.clone()));
        Self { router, repo }
    }

    /// Sends a request through the router and decodes the JSON body.
    pub async fn send(&self, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
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

    /// Creates a record and returns its id.
    pub async fn create(&self, name: &str, location: &str, location_type: &str) -> String {
        let body = serde_json::json!({
            "name": name,
            "location": location,
            "location_type": location_type,
        })
        .to_string();
        let (status, value) = self.send("POST", "/api/v1/data", Some(&body)).await;
        assert_eq!(status, StatusCode::CREATED);
        value["data"]
            .as_str()
            .expect("create should return the new id")
            .to_string()
    }
}
