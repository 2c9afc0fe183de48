// file: src/models/search_result.rs
// description: Search hit model returned by full-text queries
// reference: Used for relevance-ranked search results

use crate::models::Document;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Index id of the hit (`_id` in the backend)
    pub id: String,

    /// Document title
    #[serde(default)]
    pub title: String,

    /// Document body or abstract
    #[serde(default)]
    pub text: String,

    /// Optional link to the source document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Relevance score reported by the backend, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl SearchHit {
    /// Build a hit from its index id and the stored document source.
    pub fn from_source(id: impl Into<String>, source: Document, score: Option<f64>) -> Self {
        Self {
            id: id.into(),
            title: source.title,
            text: source.text,
            url: source.url,
            score,
        }
    }

    /// Character-bounded preview of the body, with `...` appended when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        truncate_chars(&self.text, max_chars)
    }

    /// Format as a summary string for terminal display
    pub fn format_summary(&self, max_content_len: usize) -> String {
        let score = self
            .score
            .map(|s| format!("{:.4}", s))
            .unwrap_or_else(|| "-".to_string());

        let mut out = format!("Score: {} | {} [{}]\n", score, self.title, self.id);
        if let Some(url) = &self.url {
            out.push_str(&format!("{}\n", url));
        }
        out.push_str(&self.preview(max_content_len));
        out.push('\n');
        out
    }
}

/// Truncate to at most `max_chars` characters, appending `...` if anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
