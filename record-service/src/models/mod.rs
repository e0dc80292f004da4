pub mod record;

pub use record::{null_as_empty, Record};
