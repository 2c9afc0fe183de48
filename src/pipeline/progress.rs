// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for corpus indexing
// reference: uses indicatif for progress bars and tracks per-record outcomes

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

/// Outcome counters for one indexing run.
///
/// `skipped` covers every record that did not make it into the index,
/// including upsert failures, which are also tallied in `failed_upserts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexStats {
    pub processed: usize,
    pub skipped: usize,
    pub failed_upserts: usize,
    pub total_attempted: usize,
    pub duration_secs: f64,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn docs_per_second(&self) -> f64 {
        if self.duration_secs <= 0.0 {
            return 0.0;
        }
        self.processed as f64 / self.duration_secs
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_attempted == 0 {
            return 0.0;
        }
        (self.processed as f64 / self.total_attempted as f64) * 100.0
    }

    /// Every attempted record was either processed or skipped.
    pub fn is_balanced(&self) -> bool {
        self.processed + self.skipped == self.total_attempted
    }
}

pub struct ProgressTracker {
    bar: ProgressBar,
    stats: IndexStats,
}

impl ProgressTracker {
    /// A bar when the run is bounded by `limit`, a spinner otherwise.
    pub fn new(limit: Option<usize>, visible: bool) -> Self {
        let bar = match (visible, limit) {
            (false, _) => ProgressBar::hidden(),
            (true, Some(limit)) => create_progress_bar(limit as u64),
            (true, None) => create_spinner(),
        };

        Self {
            bar,
            stats: IndexStats::new(),
        }
    }

    pub fn processed(&self) -> usize {
        self.stats.processed
    }

    pub fn attempted(&self) -> usize {
        self.stats.total_attempted
    }

    pub fn record_processed(&mut self) {
        self.stats.total_attempted += 1;
        self.stats.processed += 1;
        self.bar.inc(1);
        self.update_message();
    }

    pub fn record_skipped(&mut self) {
        self.stats.total_attempted += 1;
        self.stats.skipped += 1;
        self.update_message();
    }

    pub fn record_failed_upsert(&mut self) {
        self.stats.failed_upserts += 1;
        self.record_skipped();
    }

    pub fn finish(&self) {
        self.bar.finish_with_message(format!(
            "Indexed {} | Skipped {}",
            self.stats.processed, self.stats.skipped
        ));
    }

    pub fn stats(&self) -> IndexStats {
        self.stats.clone()
    }

    fn update_message(&self) {
        self.bar.set_message(format!(
            "Indexed: {} | Skipped: {}",
            self.stats.processed, self.stats.skipped
        ));
    }
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
    {
        bar.set_style(style.progress_chars("█▓▒░"));
    }
    bar
}

fn create_spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        bar.set_style(style);
    }
    bar
}
