//! Canned search backend for tests and offline runs.

use super::elasticsearch::{Bucket, SearchBackend, SearchResponse, TermsAggregation};
use super::query_builder::{AGE_RANGE_AGGREGATION, GENDER_AGGREGATION};
use async_trait::async_trait;
use serde_json::{json, Value};
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Answers every search with the same response and remembers the bodies it
/// was sent.
pub struct MockSearchBackend {
    response: SearchResponse,
    requests: Mutex<Vec<Value>>,
    unavailable: AtomicBool,
}

impl MockSearchBackend {
    pub fn new(response: SearchResponse) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// A response with `total` hits and the given gender / age-range buckets.
    pub fn with_buckets(total: u64, gender: &[(&str, u64)], age_range: &[(&str, u64)]) -> Self {
        let mut response = SearchResponse::default();
        response.hits.total = Some(json!({ "value": total, "relation": "eq" }));
        response
            .aggregations
            .insert(GENDER_AGGREGATION.to_string(), terms(gender));
        response
            .aggregations
            .insert(AGE_RANGE_AGGREGATION.to_string(), terms(age_range));

        Self::new(response)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn last_request(&self) -> Option<Value> {
        self.requests().pop()
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(AppError::BackendUnavailable(anyhow::anyhow!(
                "mock search backend marked unavailable"
            )))
        } else {
            Ok(())
        }
    }
}

fn terms(buckets: &[(&str, u64)]) -> TermsAggregation {
    TermsAggregation {
        buckets: buckets
            .iter()
            .map(|(key, doc_count)| Bucket {
                key: json!(key),
                doc_count: *doc_count,
            })
            .collect(),
        sum_other_doc_count: 0,
    }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    async fn search(&self, body: &Value) -> Result<SearchResponse, AppError> {
        self.check_available()?;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(body.clone());
        }
        Ok(self.response.clone())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.check_available()
    }
}
