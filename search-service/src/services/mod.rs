pub mod elasticsearch;
pub mod mock;
pub mod query_builder;

pub use elasticsearch::{ElasticsearchClient, SearchBackend, SearchResponse};
pub use mock::MockSearchBackend;
pub use query_builder::build_search_body;
