// file: src/pipeline/indexer.rs
// description: streams a corpus into the search index one document at a time
// reference: per-record failure isolation with counted skips

use crate::corpus::CorpusSource;
use crate::error::{AppError, Result};
use crate::pipeline::progress::{IndexStats, ProgressTracker};
use crate::search::{SchemaManager, SearchBackend};
use crate::utils::OperationTimer;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct Indexer {
    backend: Arc<dyn SearchBackend>,
    index_name: String,
    progress_interval: usize,
    show_progress: bool,
}

impl Indexer {
    pub fn new(backend: Arc<dyn SearchBackend>, index_name: impl Into<String>) -> Self {
        Self {
            backend,
            index_name: index_name.into(),
            progress_interval: 1000,
            show_progress: false,
        }
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    pub fn with_progress_bar(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Creates the index with the document mapping unless it already exists.
    pub async fn ensure_index(&self) -> Result<bool> {
        SchemaManager::new(self.backend.as_ref(), &self.index_name)
            .ensure_index()
            .await
    }

    /// Indexes every usable record of `source`, stopping once `max_docs` are in.
    ///
    /// Malformed or empty records and failed upserts are logged, counted as
    /// skipped and never abort the run. Failing to open or keep reading the
    /// source, or to prepare the index, is an error.
    pub async fn index_corpus(
        &self,
        source: &dyn CorpusSource,
        max_docs: Option<usize>,
    ) -> Result<IndexStats> {
        let timer = OperationTimer::new(&format!(
            "index {} into '{}'",
            source.name(),
            self.index_name
        ));

        self.ensure_index().await?;

        let mapping = source.mapping();
        let mut records = source.records().await?;
        let mut tracker = ProgressTracker::new(max_docs, self.show_progress);

        info!("Starting document indexing for {}", source.name());

        loop {
            if let Some(limit) = max_docs
                && tracker.processed() >= limit
            {
                info!("Reached max_docs limit of {}. Stopping indexing.", limit);
                break;
            }

            let Some(item) = records.next().await else {
                break;
            };

            let attempt = tracker.attempted() + 1;

            // a corpus-level error means the source itself broke mid-run
            let record = match item {
                Err(e @ AppError::Corpus(_)) => {
                    error!("Corpus {} failed after {} records: {}", source.name(), attempt - 1, e);
                    tracker.finish();
                    return Err(e);
                }
                other => other,
            };

            let document = match record.and_then(|record| mapping.to_document(&record)) {
                Ok(document) => document,
                Err(e) => {
                    warn!("Skipping record at attempt {}: {}", attempt, e);
                    tracker.record_skipped();
                    continue;
                }
            };

            if !document.has_content() {
                warn!("Document {} has no title or text. Skipping.", document.doc_id);
                tracker.record_skipped();
                continue;
            }

            match self
                .backend
                .upsert(&self.index_name, &document.doc_id, &document)
                .await
            {
                Ok(()) => {
                    tracker.record_processed();
                    if tracker.processed() % self.progress_interval == 0 {
                        let stats = tracker.stats();
                        info!(
                            "Indexed {} documents (iterated: {}, skipped: {})",
                            stats.processed, stats.total_attempted, stats.skipped
                        );
                    }
                }
                Err(e) => {
                    error!("Error indexing document {}: {}", document.doc_id, e);
                    tracker.record_failed_upsert();
                }
            }
        }

        tracker.finish();

        if let Err(e) = self.backend.refresh(&self.index_name).await {
            warn!("Could not refresh index '{}': {}", self.index_name, e);
        }

        let mut stats = tracker.stats();
        stats.duration_secs = timer.finish_with_count(stats.processed).as_secs_f64();

        info!(
            "Finished indexing {}. Processed: {}, skipped: {} ({} failed upserts), iterated: {}",
            source.name(),
            stats.processed,
            stats.skipped,
            stats.failed_upserts,
            stats.total_attempted
        );

        Ok(stats)
    }
}
