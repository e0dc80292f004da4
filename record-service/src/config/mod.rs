use serde::Deserialize;
use service_core::config::{self as core_config, get_env, is_production};
use service_core::error::AppError;

const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, Deserialize)]
pub struct RecordConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

impl RecordConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common = core_config::Config::load(DEFAULT_PORT)?;
        let is_prod = is_production();

        Ok(RecordConfig {
            common,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("mongo_crud"), is_prod)?,
                collection: get_env("MONGODB_COLLECTION", Some("people"), is_prod)?,
            },
        })
    }
}
