pub mod query;

pub use query::{LocationType, ProductQuery, SearchPlan};
