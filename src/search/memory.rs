// file: src/search/memory.rs
// description: in-process search backend for test suites, built with `cfg(test)` or the `test-util` feature
// reference: https://docs.rs/regex

use crate::error::{AppError, Result};
use crate::models::Document;
use crate::search::backend::{QueryResponse, RawHit, SearchBackend};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"\w+").expect("TOKEN regex is valid");
}

#[derive(Debug, Default)]
struct StoredIndex {
    body: Value,
    documents: BTreeMap<String, Document>,
}

/// Keeps indexes in memory and answers `multi_match` bodies by term overlap.
///
/// Writes are visible immediately, so `refresh` is a no-op. Reachability can be
/// toggled to exercise outage handling.
#[derive(Debug)]
pub struct MemoryBackend {
    indexes: RwLock<HashMap<String, StoredIndex>>,
    reachable: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            indexes: RwLock::new(HashMap::new()),
            reachable: AtomicBool::new(true),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// The settings/mappings body an index was created with.
    pub fn index_body(&self, index: &str) -> Option<Value> {
        self.read().get(index).map(|stored| stored.body.clone())
    }

    pub fn document(&self, index: &str, id: &str) -> Option<Document> {
        self.read()
            .get(index)
            .and_then(|stored| stored.documents.get(id).cloned())
    }

    fn check_reachable(&self) -> Result<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::Connection("in-memory backend marked unreachable".to_string()))
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, StoredIndex>> {
        self.indexes.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, StoredIndex>> {
        self.indexes.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn tokens(text: &str) -> Vec<String> {
    TOKEN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Splits `title^2` into (`title`, 2.0).
fn parse_field(field: &str) -> (String, f64) {
    match field.split_once('^') {
        Some((name, boost)) => (name.to_string(), boost.parse().unwrap_or(1.0)),
        None => (field.to_string(), 1.0),
    }
}

fn field_value<'d>(document: &'d Document, field: &str) -> &'d str {
    match field {
        "title" => &document.title,
        "text" => &document.text,
        "doc_id" => &document.doc_id,
        "url" => document.url.as_deref().unwrap_or(""),
        _ => "",
    }
}

fn score(document: &Document, terms: &HashSet<String>, fields: &[(String, f64)]) -> f64 {
    fields
        .iter()
        .map(|(field, boost)| {
            let matches = tokens(field_value(document, field))
                .into_iter()
                .filter(|token| terms.contains(token))
                .count();
            matches as f64 * boost
        })
        .sum()
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    fn endpoint(&self) -> String {
        "memory://".to_string()
    }

    async fn ping(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        self.check_reachable()?;
        Ok(self.read().contains_key(index))
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<()> {
        self.check_reachable()?;
        let mut indexes = self.write();
        if indexes.contains_key(index) {
            return Err(AppError::IndexAlreadyExists(index.to_string()));
        }
        indexes.insert(
            index.to_string(),
            StoredIndex {
                body: body.clone(),
                documents: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn upsert(&self, index: &str, id: &str, document: &Document) -> Result<()> {
        self.check_reachable()?;
        self.write()
            .entry(index.to_string())
            .or_insert_with(|| StoredIndex {
                body: json!({}),
                documents: BTreeMap::new(),
            })
            .documents
            .insert(id.to_string(), document.clone());
        Ok(())
    }

    async fn query(&self, index: &str, body: &Value) -> Result<QueryResponse> {
        self.check_reachable()?;
        let indexes = self.read();
        let stored = indexes
            .get(index)
            .ok_or_else(|| AppError::IndexNotFound(index.to_string()))?;

        let multi_match = &body["query"]["multi_match"];
        let query_text = multi_match["query"].as_str().ok_or_else(|| AppError::Backend {
            status: 400,
            message: "only multi_match queries are supported".to_string(),
        })?;

        let fields: Vec<(String, f64)> = match multi_match["fields"].as_array() {
            Some(fields) => fields.iter().filter_map(Value::as_str).map(parse_field).collect(),
            None => vec![("title".to_string(), 1.0), ("text".to_string(), 1.0)],
        };
        let size = body["size"].as_u64().map(|s| s as usize).unwrap_or(10);
        let terms: HashSet<String> = tokens(query_text).into_iter().collect();

        let mut scored: Vec<(f64, &String, &Document)> = stored
            .documents
            .iter()
            .map(|(id, doc)| (score(doc, &terms, &fields), id, doc))
            .filter(|(s, _, _)| *s > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        let hits = scored
            .into_iter()
            .take(size)
            .map(|(s, id, doc)| RawHit {
                id: id.clone(),
                score: Some(s),
                source: doc.clone(),
            })
            .collect();

        Ok(QueryResponse::from_hits(hits))
    }

    async fn refresh(&self, index: &str) -> Result<()> {
        self.check_reachable()?;
        if self.read().contains_key(index) {
            Ok(())
        } else {
            Err(AppError::IndexNotFound(index.to_string()))
        }
    }

    async fn count(&self, index: &str) -> Result<u64> {
        self.check_reachable()?;
        self.read()
            .get(index)
            .map(|stored| stored.documents.len() as u64)
            .ok_or_else(|| AppError::IndexNotFound(index.to_string()))
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        self.check_reachable()?;
        self.write().remove(index);
        Ok(())
    }
}
