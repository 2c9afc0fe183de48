// file: src/corpus/markdown.rs
// description: directory of markdown notes as a corpus, one record per file
// reference: https://docs.rs/walkdir

use crate::corpus::{CorpusSource, FieldMapping, RawRecord, RecordStream};
use crate::error::{AppError, Result};
use crate::parser::{FrontmatterParser, MarkdownParser};
use crate::utils::Validator;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct MarkdownCorpus {
    root: PathBuf,
    mapping: FieldMapping,
}

impl MarkdownCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mapping: FieldMapping::plain(),
        }
    }

    fn scan(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| Validator::validate_markdown_extension(path).is_ok())
            .collect();

        files.sort();
        files
    }

    /// Converts one markdown file into a raw record.
    ///
    /// Front matter `title`/`url` win; otherwise the top heading is the title.
    pub fn record_from_markdown(relative_path: &str, content: &str) -> Result<RawRecord> {
        let (frontmatter, body) = FrontmatterParser::new().extract(content)?;
        let parsed = MarkdownParser::new().parse(&body);

        let title = frontmatter
            .get("title")
            .or_else(|| parsed.title())
            .unwrap_or_default()
            .to_string();

        let mut record = RawRecord::new();
        record.insert("id".to_string(), Value::String(relative_path.to_string()));
        record.insert("title".to_string(), Value::String(title));
        record.insert("text".to_string(), Value::String(parsed.plain_text));
        if let Some(url) = frontmatter.get("url") {
            record.insert("url".to_string(), Value::String(url.to_string()));
        }

        Ok(record)
    }

    async fn load(root: PathBuf, path: PathBuf) -> Result<RawRecord> {
        let relative_path = relative_id(&root, &path);
        debug!("Reading markdown file {}", relative_path);

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            AppError::Record(format!("cannot read {}: {}", path.display(), e))
        })?;

        Self::record_from_markdown(&relative_path, &content)
            .map_err(|e| AppError::Record(format!("{}: {}", relative_path, e)))
    }
}

fn relative_id(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[async_trait]
impl CorpusSource for MarkdownCorpus {
    fn name(&self) -> String {
        format!("markdown:{}", self.root.display())
    }

    fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    async fn records(&self) -> Result<RecordStream<'_>> {
        Validator::validate_directory(&self.root)
            .map_err(|e| AppError::Corpus(e.to_string()))?;

        let files = self.scan();
        info!("Found {} markdown files under {}", files.len(), self.root.display());

        let root = self.root.clone();
        Ok(stream::iter(files)
            .then(move |path| Self::load(root.clone(), path))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_record_from_frontmatter() {
        let record = MarkdownCorpus::record_from_markdown(
            "notes/statins.md",
            "---\ntitle: Statins\nurl: https://example.org/statins\n---\n# Heading\n\nLDL cholesterol.",
        )
        .unwrap();

        assert_eq!(record["id"], "notes/statins.md");
        assert_eq!(record["title"], "Statins");
        assert_eq!(record["url"], "https://example.org/statins");
        assert!(record["text"].as_str().unwrap().contains("LDL cholesterol."));
    }

    #[test]
    fn test_heading_becomes_title() {
        let record = MarkdownCorpus::record_from_markdown("a.md", "# Lipids\n\nbody").unwrap();
        assert_eq!(record["title"], "Lipids");
        assert!(record.get("url").is_none());
    }

    #[tokio::test]
    async fn test_walks_markdown_files_only() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("a.md"), "# A\n\nalpha").unwrap();
        fs::write(temp.path().join("sub/b.markdown"), "# B\n\nbeta").unwrap();
        fs::write(temp.path().join("c.txt"), "ignored").unwrap();

        let corpus = MarkdownCorpus::new(temp.path());
        let records: Vec<RawRecord> = corpus.records().await.unwrap().try_collect().await.unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a.md", "sub/b.markdown"]);

        let doc = corpus.mapping().to_document(&records[1]).unwrap();
        assert_eq!(doc.title, "B");
    }

    #[tokio::test]
    async fn test_missing_directory_fails_to_open() {
        let corpus = MarkdownCorpus::new("/nonexistent/notes");
        assert!(matches!(corpus.records().await, Err(AppError::Corpus(_))));
    }
}
