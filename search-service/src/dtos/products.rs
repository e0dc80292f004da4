use crate::services::elasticsearch::{Bucket, SearchResponse};
use crate::services::query_builder::{AGE_RANGE_AGGREGATION, GENDER_AGGREGATION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Document counts per bucket for the two profiling aggregations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductBreakdown {
    pub gender: BTreeMap<String, u64>,
    pub age_range: BTreeMap<String, u64>,
}

impl From<&SearchResponse> for ProductBreakdown {
    fn from(response: &SearchResponse) -> Self {
        Self {
            gender: counts(response.buckets(GENDER_AGGREGATION)),
            age_range: counts(response.buckets(AGE_RANGE_AGGREGATION)),
        }
    }
}

fn counts(buckets: &[Bucket]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for bucket in buckets {
        *counts.entry(bucket.key_string()).or_insert(0) += bucket.doc_count;
    }
    counts
}
