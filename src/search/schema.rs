// file: src/search/schema.rs
// description: index settings/mapping management for the document index
// reference: https://opensearch.org/docs/latest/im-plugin/index/

use crate::error::{AppError, Result};
use crate::search::backend::SearchBackend;
use serde_json::{Value, json};
use tracing::{info, warn};

pub struct SchemaManager<'a> {
    backend: &'a dyn SearchBackend,
    index_name: &'a str,
}

impl<'a> SchemaManager<'a> {
    pub fn new(backend: &'a dyn SearchBackend, index_name: &'a str) -> Self {
        Self {
            backend,
            index_name,
        }
    }

    /// Creates the index if it is missing. Returns true when this call created it.
    pub async fn ensure_index(&self) -> Result<bool> {
        if self.backend.index_exists(self.index_name).await? {
            info!("Index '{}' already exists", self.index_name);
            return Ok(false);
        }

        match self
            .backend
            .create_index(self.index_name, &Self::index_body())
            .await
        {
            Ok(()) => Ok(true),
            Err(AppError::IndexAlreadyExists(_)) => {
                info!("Index '{}' already exists", self.index_name);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn verify_index(&self) -> Result<bool> {
        if !self.backend.index_exists(self.index_name).await? {
            warn!("Index '{}' does not exist", self.index_name);
            return Ok(false);
        }

        info!("Index '{}' exists", self.index_name);
        Ok(true)
    }

    /// Drops the index and recreates it empty with the standard mapping.
    pub async fn reset_index(&self) -> Result<()> {
        warn!("Dropping index '{}'", self.index_name);
        self.backend.delete_index(self.index_name).await?;
        self.ensure_index().await?;
        Ok(())
    }

    /// Settings and field mapping for the document index
    pub fn index_body() -> Value {
        json!({
            "settings": {
                "analysis": {
                    "analyzer": {
                        "default": {"type": "standard"}
                    }
                }
            },
            "mappings": {
                "properties": {
                    "doc_id": {"type": "keyword"},
                    "title": {"type": "text", "analyzer": "english"},
                    "text": {"type": "text", "analyzer": "english"},
                    "url": {"type": "keyword"}
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MemoryBackend;

    #[test]
    fn test_index_body_fields() {
        let body = SchemaManager::index_body();
        let properties = &body["mappings"]["properties"];

        assert_eq!(properties["doc_id"]["type"], "keyword");
        assert_eq!(properties["title"]["analyzer"], "english");
        assert_eq!(properties["text"]["analyzer"], "english");
        assert_eq!(properties["url"]["type"], "keyword");
    }

    #[tokio::test]
    async fn test_ensure_index_is_idempotent() {
        let backend = MemoryBackend::new();
        let manager = SchemaManager::new(&backend, "scifact");

        assert!(manager.ensure_index().await.unwrap());
        assert!(!manager.ensure_index().await.unwrap());
        assert!(manager.verify_index().await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_index_keeps_existing_mapping() {
        let backend = MemoryBackend::new();
        let custom = serde_json::json!({"mappings": {"properties": {"doc_id": {"type": "text"}}}});
        backend.create_index("scifact", &custom).await.unwrap();

        let manager = SchemaManager::new(&backend, "scifact");
        manager.ensure_index().await.unwrap();
        manager.ensure_index().await.unwrap();

        assert_eq!(backend.index_body("scifact"), Some(custom));
    }

    #[tokio::test]
    async fn test_reset_index_clears_documents() {
        let backend = MemoryBackend::new();
        let manager = SchemaManager::new(&backend, "scifact");
        manager.ensure_index().await.unwrap();
        backend
            .upsert("scifact", "1", &crate::models::Document::new("1", "t", "x"))
            .await
            .unwrap();

        manager.reset_index().await.unwrap();
        assert_eq!(backend.count("scifact").await.unwrap(), 0);
        assert_eq!(backend.index_body("scifact"), Some(SchemaManager::index_body()));
    }
}
