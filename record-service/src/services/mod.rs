pub mod database;
pub mod repository;

pub use database::MongoDb;
pub use repository::{InMemoryRecordRepository, RecordRepository};
