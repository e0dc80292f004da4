use crate::dtos::{RecordPayload, RecordResponse};
use crate::models::Record;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use service_core::envelope::{Envelope, Message};
use service_core::error::AppError;

pub async fn list_records(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let records = state.repo.list().await?;

    tracing::debug!(count = records.len(), "Listed records");

    // An empty collection is reported as `data: null`, not `[]`.
    let data = if records.is_empty() {
        None
    } else {
        Some(
            records
                .into_iter()
                .map(RecordResponse::from)
                .collect::<Vec<_>>(),
        )
    };

    Ok(Envelope::ok(data, Message::Success))
}

pub async fn get_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_record_id(&record_id)?;
    let record = find_existing(&state, id).await?;

    Ok(Envelope::success(RecordResponse::from(record)))
}

pub async fn create_record(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload = decode_payload(&body)?;
    let id = state.repo.insert(Record::new(payload)).await?;

    tracing::info!(record_id = %id, "Record created");

    Ok((StatusCode::CREATED, Json(Envelope::success(id.to_hex()))))
}

pub async fn bulk_create_records(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payloads = decode_stream(&body)?;
    let records: Vec<Record> = payloads.into_iter().map(Record::new).collect();
    let ids = state.repo.insert_many(records).await?;

    tracing::info!(count = ids.len(), "Records bulk created");

    let ids: Vec<String> = ids.into_iter().map(ObjectId::to_hex).collect();
    Ok((StatusCode::CREATED, Json(Envelope::success(ids))))
}

pub async fn update_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_record_id(&record_id)?;
    let patch = decode_payload(&body)?;

    let existing = find_existing(&state, id).await?;
    let merged = existing.merge(patch);

    // The record can disappear between the read and the write.
    if !state.repo.replace(id, &merged).await? {
        return Err(not_found(id));
    }

    tracing::info!(record_id = %id, "Record updated");

    Ok(Envelope::updated(RecordResponse::from(merged)))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_record_id(&record_id)?;

    if !state.repo.delete(id).await? {
        return Err(not_found(id));
    }

    tracing::info!(record_id = %id, "Record deleted");

    Ok(Envelope::deleted(id.to_hex()))
}

async fn find_existing(state: &AppState, id: ObjectId) -> Result<Record, AppError> {
    state.repo.get(id).await?.ok_or_else(|| not_found(id))
}

fn not_found(id: ObjectId) -> AppError {
    AppError::not_found(format!("Record {} not found", id.to_hex()))
}

pub fn parse_record_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw)
        .map_err(|_| AppError::bad_request(format!("Invalid record id '{}'", raw)))
}

/// Decodes a single JSON object body.
pub fn decode_payload(body: &[u8]) -> Result<RecordPayload, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::bad_request("Request body is empty"));
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::bad_request(format!("Invalid JSON body: {}", e)))?;
    payload_from_value(value, 0)
}

/// Decodes a body of concatenated JSON objects, read to the end. Nothing is
/// returned unless every object decodes.
pub fn decode_stream(body: &[u8]) -> Result<Vec<RecordPayload>, AppError> {
    let payloads = serde_json::Deserializer::from_slice(body)
        .into_iter::<Value>()
        .enumerate()
        .map(|(index, value)| {
            let value = value.map_err(|e| {
                AppError::bad_request(format!("Invalid JSON in record {}: {}", index, e))
            })?;
            payload_from_value(value, index)
        })
        .collect::<Result<Vec<_>, _>>()?;

    if payloads.is_empty() {
        return Err(AppError::bad_request("Bulk request contains no records"));
    }
    Ok(payloads)
}

fn payload_from_value(value: Value, index: usize) -> Result<RecordPayload, AppError> {
    if !value.is_object() {
        return Err(AppError::bad_request(format!(
            "Record {} must be a JSON object",
            index
        )));
    }
    serde_json::from_value(value)
        .map_err(|e| AppError::bad_request(format!("Invalid record {}: {}", index, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_object_ids() {
        let id = ObjectId::new();
        assert_eq!(parse_record_id(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn rejects_malformed_ids() {
        let err = parse_record_id("not-an-id").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn stream_accepts_concatenated_and_newline_separated_objects() {
        let body = br#"{"name":"a","location":"x","location_type":"city"}{"name":"b"}
{"name":"c","location":"z"}
"#;
        let payloads = decode_stream(body).unwrap();
        let names: Vec<_> = payloads.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(payloads[1].location, "");
    }

    #[test]
    fn stream_rejects_arrays() {
        let err = decode_stream(br#"[{"name":"a"}]"#).unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));
    }

    #[test]
    fn stream_rejects_trailing_garbage() {
        assert!(decode_stream(br#"{"name":"a"} nope"#).is_err());
    }

    #[test]
    fn stream_rejects_empty_body() {
        assert!(decode_stream(b"  \n").is_err());
    }

    #[test]
    fn payload_ignores_client_supplied_id() {
        let payload =
            decode_payload(br#"{"_id":"64b7f0c2a1b2c3d4e5f60718","name":"A"}"#).unwrap();
        assert_eq!(payload.name, "A");
        assert_eq!(payload.location_type, "");
    }

    #[test]
    fn payload_rejects_wrong_field_types() {
        assert!(decode_payload(br#"{"name": 5}"#).is_err());
    }
}
