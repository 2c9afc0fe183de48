// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod corpus;
pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod search;
pub mod service;
pub mod summarizer;
pub mod utils;
pub mod web;

pub use config::{Config, CorpusConfig, SearchConfig, SummarizerConfig};
pub use corpus::{CorpusSource, FieldMapping, HuggingFaceCorpus, JsonlCorpus, MarkdownCorpus, open_corpus};
pub use error::{AppError, Result};
pub use models::{Document, SearchHit};
pub use parser::{Frontmatter, FrontmatterParser, MarkdownParser, ParsedMarkdown};
pub use pipeline::{IndexStats, Indexer, ProgressTracker};
pub use search::{OpenSearchClient, SchemaManager, SearchBackend, search_documents};
#[cfg(any(test, feature = "test-util"))]
pub use search::MemoryBackend;
pub use service::{SearchPage, SearchService};
pub use summarizer::SummarizationClient;
pub use utils::{HealthCheck, HealthReport, HealthStatus, OperationTimer, Validator};
