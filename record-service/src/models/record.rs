use crate::dtos::RecordPayload;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize};

/// A stored record. `id` is `None` only before the first insert; MongoDB
/// assigns it and it never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location_type: String,
}

/// Reads a string field where `null` means the same as absent.
pub fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Record {
    pub fn new(payload: RecordPayload) -> Self {
        Self {
            id: None,
            name: payload.name,
            location: payload.location,
            location_type: payload.location_type,
        }
    }

    /// Applies `patch` field by field. Empty strings in the patch keep the
    /// current value; the identifier is never touched.
    pub fn merge(&self, patch: RecordPayload) -> Record {
        Record {
            id: self.id,
            name: pick(patch.name, &self.name),
            location: pick(patch.location, &self.location),
            location_type: pick(patch.location_type, &self.location_type),
        }
    }
}

fn pick(candidate: String, current: &str) -> String {
    if candidate.is_empty() {
        current.to_string()
    } else {
        candidate
    }
}
