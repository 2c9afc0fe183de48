// file: src/corpus/mod.rs
// description: corpus adapters feeding raw records into the indexer
// reference: https://docs.rs/futures/latest/futures/stream/

pub mod huggingface;
pub mod jsonl;
pub mod markdown;

pub use huggingface::HuggingFaceCorpus;
pub use jsonl::JsonlCorpus;
pub use markdown::MarkdownCorpus;

use crate::config::CorpusConfig;
use crate::error::{AppError, Result};
use crate::models::Document;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record exactly as the corpus yields it, before field mapping.
pub type RawRecord = Map<String, Value>;

/// Lazily produced records. Per-record failures are items, not stream termination.
pub type RecordStream<'a> = BoxStream<'a, Result<RawRecord>>;

/// A named, finite source of raw records.
///
/// Opening the source may fail as a whole; once the stream is handed out,
/// decode problems surface per record so the indexer can skip and count them.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    fn name(&self) -> String;

    /// How raw records of this corpus map onto [`Document`] fields.
    fn mapping(&self) -> &FieldMapping;

    async fn records(&self) -> Result<RecordStream<'_>>;
}

/// Names of the record keys that hold each document field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldMapping {
    pub id_field: String,
    pub title_field: String,
    pub text_field: String,
    pub url_field: Option<String>,
}

impl Default for FieldMapping {
    /// BeIR layout: `_id`, `title`, `text`.
    fn default() -> Self {
        Self {
            id_field: "_id".to_string(),
            title_field: "title".to_string(),
            text_field: "text".to_string(),
            url_field: None,
        }
    }
}

impl FieldMapping {
    /// Layout used by adapters that synthesize their own records.
    pub fn plain() -> Self {
        Self {
            id_field: "id".to_string(),
            title_field: "title".to_string(),
            text_field: "text".to_string(),
            url_field: Some("url".to_string()),
        }
    }

    /// Maps a raw record onto a document.
    ///
    /// The id is required and may be a string or a number; title, text and url
    /// default to empty when absent or null but must be strings when present.
    pub fn to_document(&self, record: &RawRecord) -> Result<Document> {
        let doc_id = match record.get(&self.id_field) {
            Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            Some(Value::String(_)) => {
                return Err(AppError::Record(format!("field '{}' is empty", self.id_field)));
            }
            Some(_) => {
                return Err(AppError::Record(format!(
                    "field '{}' is not a string or number",
                    self.id_field
                )));
            }
            None => {
                return Err(AppError::Record(format!(
                    "missing required field '{}'",
                    self.id_field
                )));
            }
        };

        let title = optional_string(record, &self.title_field)?;
        let text = optional_string(record, &self.text_field)?;
        let mut document = Document::new(doc_id, title, text);

        if let Some(url_field) = &self.url_field {
            document = document.with_url(optional_string(record, url_field)?);
        }

        Ok(document)
    }
}

fn optional_string(record: &RawRecord, field: &str) -> Result<String> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(AppError::Record(format!("field '{}' is not a string", field))),
    }
}

/// Builds the corpus adapter described by the configuration.
pub fn open_corpus(config: &CorpusConfig, token: Option<&str>) -> Result<Box<dyn CorpusSource>> {
    Ok(match config {
        CorpusConfig::Jsonl { path, mapping } => {
            Box::new(JsonlCorpus::new(path.clone()).with_mapping(mapping.clone()))
        }
        CorpusConfig::HuggingFace {
            dataset,
            config,
            split,
            page_size,
            api_base,
        } => {
            let mut corpus = HuggingFaceCorpus::new(dataset, config, split)?
                .with_api_base(api_base)
                .with_page_size(*page_size);
            if let Some(token) = token {
                corpus = corpus.with_token(token);
            }
            Box::new(corpus)
        }
        CorpusConfig::Markdown { path } => Box::new(MarkdownCorpus::new(path.clone())),
    })
}
