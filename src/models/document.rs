// file: src/models/document.rs
// description: core document model stored in the search index
// reference: internal data structures

use serde::{Deserialize, Serialize};

/// A corpus entry as it is stored in the search index, keyed by `doc_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub doc_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Document {
    pub fn new(doc_id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            title: title.into(),
            text: text.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.url = if url.trim().is_empty() { None } else { Some(url) };
        self
    }

    /// A document is indexable when it carries a title or some body text.
    pub fn has_content(&self) -> bool {
        !self.title.trim().is_empty() || !self.text.trim().is_empty()
    }
}
