//! Search request bodies for the profiling index.

use crate::models::SearchPlan;
use serde_json::{json, Value};

pub const GENDER_AGGREGATION: &str = "gender";
pub const GENDER_FIELD: &str = "gender.keyword";
pub const AGE_RANGE_AGGREGATION: &str = "age_range";
pub const AGE_RANGE_FIELD: &str = "age_range.keyword";

/// Builds a hit-less search (`size: 0`) whose aggregations cover every
/// matching document.
pub fn build_search_body(plan: &SearchPlan, bucket_size: u32) -> Value {
    let query = match plan {
        SearchPlan::All => json!({ "match_all": {} }),
        SearchPlan::Filtered {
            name,
            location,
            location_type,
        } => json!({
            "bool": {
                "must": [
                    { "wildcard": { "name": { "value": contains_pattern(name) } } },
                    { "wildcard": { location_type.field(): { "value": contains_pattern(location) } } }
                ]
            }
        }),
    };

    json!({
        "size": 0,
        "track_total_hits": true,
        "query": query,
        "aggs": {
            GENDER_AGGREGATION: { "terms": { "field": GENDER_FIELD, "size": bucket_size } },
            AGE_RANGE_AGGREGATION: { "terms": { "field": AGE_RANGE_FIELD, "size": bucket_size } }
        }
    })
}

/// `*term*` with wildcard metacharacters in `term` escaped. Lowercased
/// because the target fields are analyzed.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('*');
    for c in term.trim().to_lowercase().chars() {
        if matches!(c, '*' | '?' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}
