use crate::config::ElasticsearchConfig;
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::error::AppError;
use service_core::observability::{TracedClientExt, TracedRequest};
use std::collections::HashMap;
use std::time::Duration;

/// The subset of a `_search` response this service reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Hits,
    #[serde(default)]
    pub aggregations: HashMap<String, TermsAggregation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hits {
    /// `{"value": n, "relation": ..}` on 7.x+, a bare number on older clusters.
    #[serde(default)]
    pub total: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermsAggregation {
    #[serde(default)]
    pub buckets: Vec<Bucket>,
    #[serde(default)]
    pub sum_other_doc_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bucket {
    pub key: Value,
    pub doc_count: u64,
}

impl SearchResponse {
    pub fn total_hits(&self) -> u64 {
        match &self.hits.total {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
            _ => 0,
        }
    }

    pub fn buckets(&self, aggregation: &str) -> &[Bucket] {
        self.aggregations
            .get(aggregation)
            .map(|agg| agg.buckets.as_slice())
            .unwrap_or(&[])
    }

    /// Documents that fell outside the returned buckets of `aggregation`.
    pub fn other_doc_count(&self, aggregation: &str) -> u64 {
        self.aggregations
            .get(aggregation)
            .map(|agg| agg.sum_other_doc_count)
            .unwrap_or(0)
    }
}

impl Bucket {
    /// Bucket key as text; keyword keys are strings, numeric keys are rendered.
    pub fn key_string(&self) -> String {
        match &self.key {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, body: &Value) -> Result<SearchResponse, AppError>;
    async fn health_check(&self) -> Result<(), AppError>;
}

/// HTTP client for an Elasticsearch-compatible `_search` API.
#[derive(Clone)]
pub struct ElasticsearchClient {
    client: reqwest::Client,
    search_url: String,
    health_url: String,
    username: Option<String>,
    password: Option<Secret<String>>,
}

impl ElasticsearchClient {
    pub fn new(config: &ElasticsearchConfig) -> Result<Self, AppError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to build search HTTP client: {}", e))
            })?;

        let base = config.url.trim_end_matches('/');
        tracing::info!(url = %base, index = %config.index, ?timeout, "Search backend configured");

        Ok(Self {
            client,
            search_url: format!("{}/{}/_search", base, config.index),
            health_url: format!("{}/_cluster/health", base),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn authorize(&self, request: TracedRequest) -> TracedRequest {
        match &self.username {
            Some(username) => request.basic_auth(
                username,
                self.password.as_ref().map(|p| p.expose_secret().as_str()),
            ),
            None => request,
        }
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchClient {
    async fn search(&self, body: &Value) -> Result<SearchResponse, AppError> {
        tracing::debug!(url = %self.search_url, "Sending search request");

        let response = self
            .authorize(self.client.traced_post(&self.search_url).json(body))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Search request failed: {}", e);
                AppError::from(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "Search backend returned an error");
            return Err(AppError::BadGateway(format!(
                "search backend error {}: {}",
                status, error_text
            )));
        }

        response.json::<SearchResponse>().await.map_err(|e| {
            AppError::BadGateway(format!("Failed to parse search response: {}", e))
        })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        let response = self
            .authorize(self.client.traced_get(&self.health_url))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Search backend health check failed: {}", e);
                AppError::from(e)
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::BadGateway(format!(
                "search backend health returned {}",
                response.status()
            )))
        }
    }
}
