pub mod records;

pub use records::{RecordPayload, RecordResponse};
