// file: src/corpus/huggingface.rs
// description: pages through a Hugging Face dataset via the datasets-server rows API
// reference: https://huggingface.co/docs/dataset-viewer/rows

use crate::corpus::{CorpusSource, FieldMapping, RawRecord, RecordStream};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Largest page the rows API serves.
pub const MAX_PAGE_SIZE: usize = 100;

pub struct HuggingFaceCorpus {
    http: Client,
    api_base: String,
    dataset: String,
    config: String,
    split: String,
    page_size: usize,
    token: Option<String>,
    mapping: FieldMapping,
}

#[derive(Debug, Deserialize)]
struct RowsResponse {
    #[serde(default)]
    rows: Vec<RowEntry>,
    num_rows_total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row: Value,
}

/// Cursor over the remote split; owns everything it needs so the stream is `'static`.
struct PageCursor {
    http: Client,
    url: String,
    params: [(&'static str, String); 3],
    page_size: usize,
    token: Option<String>,
    offset: u64,
    total: Option<u64>,
    buffer: VecDeque<Result<RawRecord>>,
    exhausted: bool,
}

impl PageCursor {
    async fn fetch_page(&mut self) -> Result<()> {
        debug!("Fetching rows {}..{}", self.offset, self.offset + self.page_size as u64);

        let mut request = self
            .http
            .get(&self.url)
            .query(&self.params)
            .query(&[("offset", self.offset), ("length", self.page_size as u64)]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            AppError::Corpus(format!("datasets-server request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Corpus(format!(
                "datasets-server returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let page: RowsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Corpus(format!("Unexpected datasets-server payload: {}", e)))?;

        if page.num_rows_total.is_some() {
            self.total = page.num_rows_total;
        }

        if page.rows.is_empty() {
            self.exhausted = true;
            return Ok(());
        }

        self.offset += page.rows.len() as u64;
        if self.total.is_some_and(|total| self.offset >= total) {
            self.exhausted = true;
        }

        for entry in page.rows {
            self.buffer.push_back(match entry.row {
                Value::Object(map) => Ok(map),
                other => Err(AppError::Record(format!("row is not an object: {}", other))),
            });
        }

        Ok(())
    }

    async fn next_record(mut self) -> Option<(Result<RawRecord>, Self)> {
        if let Some(item) = self.buffer.pop_front() {
            return Some((item, self));
        }

        if self.exhausted {
            return None;
        }

        match self.fetch_page().await {
            Ok(()) => {
                let item = self.buffer.pop_front()?;
                Some((item, self))
            }
            Err(e) => {
                warn!("Corpus iteration broke at offset {}: {}", self.offset, e);
                self.exhausted = true;
                Some((Err(e), self))
            }
        }
    }
}

impl HuggingFaceCorpus {
    pub fn new(dataset: &str, config: &str, split: &str) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            http,
            api_base: "https://datasets-server.huggingface.co".to_string(),
            dataset: dataset.to_string(),
            config: config.to_string(),
            split: split.to_string(),
            page_size: MAX_PAGE_SIZE,
            token: None,
            mapping: FieldMapping::default(),
        })
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = mapping;
        self
    }

    fn cursor(&self) -> PageCursor {
        PageCursor {
            http: self.http.clone(),
            url: format!("{}/rows", self.api_base),
            params: [
                ("dataset", self.dataset.clone()),
                ("config", self.config.clone()),
                ("split", self.split.clone()),
            ],
            page_size: self.page_size,
            token: self.token.clone(),
            offset: 0,
            total: None,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }
}

#[async_trait]
impl CorpusSource for HuggingFaceCorpus {
    fn name(&self) -> String {
        format!("huggingface:{}/{}/{}", self.dataset, self.config, self.split)
    }

    fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    async fn records(&self) -> Result<RecordStream<'_>> {
        info!("Loading {} from Hugging Face datasets-server", self.name());

        // The first page doubles as the availability check for the whole dataset.
        let mut cursor = self.cursor();
        cursor.fetch_page().await?;

        if let Some(total) = cursor.total {
            info!("Dataset reports {} rows", total);
        }

        Ok(stream::unfold(cursor, PageCursor::next_record).boxed())
    }
}
