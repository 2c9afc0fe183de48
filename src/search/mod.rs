// file: src/search/mod.rs
// description: search backend operations module exports
// reference: internal module structure

pub mod backend;
pub mod client;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod query;
pub mod schema;

pub use backend::{QueryResponse, RawHit, SearchBackend};
pub use client::OpenSearchClient;
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryBackend;
pub use query::{DEFAULT_RESULT_SIZE, build_query, search_documents};
pub use schema::SchemaManager;
