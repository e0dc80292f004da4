pub mod health;
pub mod records;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use records::{
    bulk_create_records, create_record, delete_record, get_record, list_records, update_record,
};
