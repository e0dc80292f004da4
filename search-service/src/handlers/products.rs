use crate::dtos::ProductBreakdown;
use crate::models::{ProductQuery, SearchPlan};
use crate::services::build_search_body;
use crate::services::query_builder::{AGE_RANGE_AGGREGATION, GENDER_AGGREGATION};
use crate::startup::AppState;
use axum::{body::Bytes, extract::State, response::IntoResponse};
use serde_json::Value;
use service_core::envelope::Envelope;
use service_core::error::AppError;

pub async fn search_products(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let query = decode_query(&body)?;
    let plan = query.plan()?;
    let filtered = matches!(plan, SearchPlan::Filtered { .. });

    let request = build_search_body(&plan, state.bucket_size);
    let response = state.search.search(&request).await?;

    let breakdown = ProductBreakdown::from(&response);

    tracing::info!(
        total_hits = response.total_hits(),
        filtered,
        "Product search completed"
    );
    for (aggregation, buckets) in [
        (GENDER_AGGREGATION, &breakdown.gender),
        (AGE_RANGE_AGGREGATION, &breakdown.age_range),
    ] {
        for (bucket, count) in buckets {
            tracing::info!(aggregation, bucket = %bucket, count, "Aggregation bucket");
        }
        let other = response.other_doc_count(aggregation);
        if other > 0 {
            tracing::info!(aggregation, other, "Documents outside the returned buckets");
        }
    }

    Ok(Envelope::success(breakdown))
}

/// An absent body, or `null`, is the empty query.
pub fn decode_query(body: &[u8]) -> Result<ProductQuery, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ProductQuery::default());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::bad_request(format!("Invalid JSON body: {}", e)))?;

    match value {
        Value::Null => Ok(ProductQuery::default()),
        Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| AppError::bad_request(format!("Invalid query: {}", e))),
        _ => Err(AppError::bad_request("Query must be a JSON object")),
    }
}
