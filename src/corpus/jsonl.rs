// file: src/corpus/jsonl.rs
// description: line-delimited JSON corpus reader (BeIR corpus.jsonl layout)
// reference: https://github.com/beir-cellar/beir

use crate::corpus::{CorpusSource, FieldMapping, RawRecord, RecordStream};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use serde_json::Value;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

pub struct JsonlCorpus {
    path: PathBuf,
    mapping: FieldMapping,
}

struct LineState {
    reader: BufReader<File>,
    buf: Vec<u8>,
    line_no: usize,
    finished: bool,
}

impl JsonlCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mapping: FieldMapping::default(),
        }
    }

    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = mapping;
        self
    }

    fn parse_line(line: &str, line_no: usize) -> Result<RawRecord> {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(AppError::Record(format!(
                "line {} is not a JSON object",
                line_no
            ))),
            Err(e) => Err(AppError::Record(format!("line {}: {}", line_no, e))),
        }
    }

    async fn next_record(mut state: LineState) -> Option<(Result<RawRecord>, LineState)> {
        if state.finished {
            return None;
        }

        loop {
            state.buf.clear();
            match state.reader.read_until(b'\n', &mut state.buf).await {
                Ok(0) => return None,
                Ok(_) => {
                    state.line_no += 1;
                    let line = match String::from_utf8(std::mem::take(&mut state.buf)) {
                        Ok(line) => line,
                        Err(e) => {
                            let err = AppError::Record(format!(
                                "line {} is not valid UTF-8: {}",
                                state.line_no, e
                            ));
                            return Some((Err(err), state));
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    let record = Self::parse_line(&line, state.line_no);
                    return Some((record, state));
                }
                Err(e) => {
                    // the reader cannot resume after an I/O failure
                    state.finished = true;
                    let err = AppError::Corpus(format!(
                        "read failed after line {}: {}",
                        state.line_no, e
                    ));
                    return Some((Err(err), state));
                }
            }
        }
    }
}

#[async_trait]
impl CorpusSource for JsonlCorpus {
    fn name(&self) -> String {
        format!("jsonl:{}", self.path.display())
    }

    fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    async fn records(&self) -> Result<RecordStream<'_>> {
        info!("Opening JSONL corpus {}", self.path.display());

        let file = File::open(&self.path).await.map_err(|e| {
            AppError::Corpus(format!("Cannot open {}: {}", self.path.display(), e))
        })?;

        debug!("Streaming records from {}", self.path.display());

        let state = LineState {
            reader: BufReader::new(file),
            buf: Vec::new(),
            line_no: 0,
            finished: false,
        };

        Ok(stream::unfold(state, Self::next_record).boxed())
    }
}
