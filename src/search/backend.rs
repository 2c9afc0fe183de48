// file: src/search/backend.rs
// description: search backend abstraction shared by the indexer and the query service
// reference: https://opensearch.org/docs/latest/api-reference/

use crate::error::Result;
use crate::models::{Document, SearchHit};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Operations the application needs from a full-text search engine.
///
/// The engine owns ranking, analysis and storage; callers only ever speak in
/// index names, document ids and query bodies.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Human readable location of the backend, used in log lines.
    fn endpoint(&self) -> String;

    /// Returns false when the backend cannot be reached. Never errors.
    async fn ping(&self) -> bool;

    async fn index_exists(&self, index: &str) -> Result<bool>;

    /// Creates an index from a settings/mappings body.
    ///
    /// Fails with `AppError::IndexAlreadyExists` if the index is already present.
    async fn create_index(&self, index: &str, body: &Value) -> Result<()>;

    /// Insert-or-overwrite by id.
    async fn upsert(&self, index: &str, id: &str, document: &Document) -> Result<()>;

    /// Runs a query body. Fails with `AppError::IndexNotFound` for a missing index.
    async fn query(&self, index: &str, body: &Value) -> Result<QueryResponse>;

    /// Makes recent writes visible to queries.
    async fn refresh(&self, index: &str) -> Result<()>;

    async fn count(&self, index: &str) -> Result<u64>;

    /// Deletes the index. Deleting a missing index is not an error.
    async fn delete_index(&self, index: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    pub hits: HitsEnvelope,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

/// A single hit as the engine reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source")]
    pub source: Document,
}

impl QueryResponse {
    pub fn from_hits(hits: Vec<RawHit>) -> Self {
        Self {
            hits: HitsEnvelope { hits },
        }
    }

    pub fn into_search_hits(self) -> Vec<SearchHit> {
        self.hits
            .hits
            .into_iter()
            .map(|hit| SearchHit::from_source(hit.id, hit.source, hit.score))
            .collect()
    }
}
