use secrecy::Secret;
use serde::Deserialize;
use service_core::config::{self as core_config, get_env, is_production};
use service_core::error::AppError;
use std::env;

const DEFAULT_PORT: u16 = 8001;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BUCKET_SIZE: u32 = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub elasticsearch: ElasticsearchConfig,
    /// Maximum number of buckets returned per aggregation.
    pub bucket_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElasticsearchConfig {
    pub url: String,
    pub index: String,
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
    pub timeout_secs: u64,
}

impl SearchConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load(DEFAULT_PORT)?;
        let is_prod = is_production();

        Ok(SearchConfig {
            common,
            elasticsearch: ElasticsearchConfig {
                url: get_env("ELASTICSEARCH_URL", Some("http://localhost:9200"), is_prod)?,
                index: get_env("ELASTICSEARCH_INDEX", Some("profiling"), is_prod)?,
                username: env::var("ELASTICSEARCH_USERNAME").ok(),
                password: env::var("ELASTICSEARCH_PASSWORD").ok().map(Secret::new),
                timeout_secs: parse_env("ELASTICSEARCH_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            },
            bucket_size: parse_env("SEARCH_BUCKET_SIZE", DEFAULT_BUCKET_SIZE)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr + ToString,
    T::Err: std::fmt::Display,
{
    let raw = get_env(key, Some(&default.to_string()), false)?;
    raw.parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}
