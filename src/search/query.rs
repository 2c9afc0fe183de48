// file: src/search/query.rs
// description: full-text relevance query over title and text fields
// reference: https://opensearch.org/docs/latest/query-dsl/full-text/multi-match/

use crate::error::{AppError, Result};
use crate::models::SearchHit;
use crate::search::backend::SearchBackend;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

/// Default number of hits requested per query.
pub const DEFAULT_RESULT_SIZE: usize = 10;

/// Title matches weigh twice as much as body matches.
pub const TITLE_BOOST: u32 = 2;

pub fn build_query(query_text: &str, size: usize) -> Value {
    json!({
        "query": {
            "multi_match": {
                "query": query_text,
                "fields": [format!("title^{}", TITLE_BOOST), "text"]
            }
        },
        "size": size
    })
}

/// Search the index for `query_text`.
///
/// A blank query or a missing index yields an empty list; any other backend
/// failure is returned as an error so callers can tell it apart from "no results".
pub async fn search_documents(
    backend: &dyn SearchBackend,
    index_name: &str,
    query_text: &str,
    size: usize,
) -> Result<Vec<SearchHit>> {
    let query_text = query_text.trim();
    if query_text.is_empty() {
        debug!("Blank query, skipping search");
        return Ok(Vec::new());
    }

    let body = build_query(query_text, size);

    match backend.query(index_name, &body).await {
        Ok(response) => {
            let hits = response.into_search_hits();
            info!("Search for '{}' returned {} hits", query_text, hits.len());
            Ok(hits)
        }
        Err(AppError::IndexNotFound(_)) => {
            warn!("Index '{}' not found during search", index_name);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}
