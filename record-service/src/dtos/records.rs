use crate::models::{null_as_empty, Record};
use serde::{Deserialize, Serialize};

/// Request body for create, bulk create and update. Missing or `null` fields
/// decode as empty strings; an `_id` sent by the client is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RecordPayload {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub location_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub location: String,
    pub location_type: String,
}

impl From<Record> for RecordResponse {
    fn from(record: Record) -> Self {
        Self {
            id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: record.name,
            location: record.location,
            location_type: record.location_type,
        }
    }
}
