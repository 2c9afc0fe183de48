// file: src/service.rs
// description: per-request search-then-summarize flow shared by the web and CLI surfaces
// reference: request orchestration over the search backend and summarizer

use crate::config::Config;
use crate::error::Result;
use crate::models::SearchHit;
use crate::search::{SearchBackend, search_documents};
use crate::summarizer::SummarizationClient;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const MSG_BACKEND_UNREACHABLE: &str = "Could not connect to Search Engine. Please try again later.";
pub const MSG_NO_RESULTS: &str = "No results found for your query.";

/// Everything the results page shows for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchPage {
    pub query: String,
    pub hits: Vec<SearchHit>,
    pub summary: Option<String>,
    pub error: Option<String>,
}

impl SearchPage {
    fn for_query(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Self::default()
        }
    }

    /// No query was submitted.
    pub fn is_empty_state(&self) -> bool {
        self.query.is_empty()
    }
}

/// Shared, read-only state for answering queries.
pub struct SearchService {
    backend: Arc<dyn SearchBackend>,
    summarizer: SummarizationClient,
    index_name: String,
    result_size: usize,
}

impl SearchService {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        summarizer: SummarizationClient,
        index_name: impl Into<String>,
        result_size: usize,
    ) -> Self {
        Self {
            backend,
            summarizer,
            index_name: index_name.into(),
            result_size,
        }
    }

    pub fn from_config(config: &Config, backend: Arc<dyn SearchBackend>) -> Result<Self> {
        Ok(Self::new(
            backend,
            SummarizationClient::new(&config.summarizer)?,
            config.search.index_name.clone(),
            config.search.result_size,
        ))
    }

    pub fn backend(&self) -> &Arc<dyn SearchBackend> {
        &self.backend
    }

    pub fn summarizer(&self) -> &SummarizationClient {
        &self.summarizer
    }

    pub fn with_result_size(mut self, size: usize) -> Self {
        self.result_size = size.max(1);
        self
    }

    /// Search, then summarize the top hits.
    pub async fn run(&self, query: &str) -> SearchPage {
        self.run_with(query, true).await
    }

    /// Search and, when `summarize` is set, summarize the top hits.
    ///
    /// Failures end up in the page's `error` field; nothing is returned as `Err`.
    pub async fn run_with(&self, query: &str, summarize: bool) -> SearchPage {
        let query = query.trim();
        if query.is_empty() {
            return SearchPage::default();
        }

        let mut page = SearchPage::for_query(query);

        if !self.backend.ping().await {
            warn!("Search backend at {} is unreachable", self.backend.endpoint());
            page.error = Some(MSG_BACKEND_UNREACHABLE.to_string());
            return page;
        }

        match search_documents(self.backend.as_ref(), &self.index_name, query, self.result_size).await
        {
            Ok(hits) => page.hits = hits,
            Err(e) => {
                error!("Search for '{}' failed: {}", query, e);
                page.error = Some(format!("An error occurred during the search: {}", e));
                return page;
            }
        }

        if page.hits.is_empty() {
            info!("No results for '{}'", query);
            page.error = Some(MSG_NO_RESULTS.to_string());
        } else if summarize {
            page.summary = Some(self.summarizer.summarize(query, &page.hits).await);
        }

        page
    }
}
