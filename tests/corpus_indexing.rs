// file: tests/corpus_indexing.rs
// description: indexing runs over the file-backed corpus adapters
// reference: tempfile fixtures for jsonl and markdown corpora

use esempeha::config::CorpusConfig;
use esempeha::{
    AppError, FieldMapping, HuggingFaceCorpus, Indexer, MarkdownCorpus, MemoryBackend, SearchBackend,
    open_corpus,
};
use mockito::Matcher;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn write_jsonl(dir: &TempDir, lines: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join("corpus.jsonl");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

#[tokio::test]
async fn jsonl_run_balances_processed_and_skipped() {
    let dir = TempDir::new().unwrap();
    let path = write_jsonl(
        &dir,
        &[
            r#"{"_id": "1", "title": "Statins", "text": "LDL"}"#,
            r#"not json"#,
            r#"{"_id": "3", "title": "", "text": ""}"#,
            "",
            r#"{"_id": 4, "title": "Numeric id", "text": "kept"}"#,
            r#"{"title": "missing id"}"#,
        ],
    );

    let corpus = open_corpus(
        &CorpusConfig::Jsonl {
            path,
            mapping: FieldMapping::default(),
        },
        None,
    )
    .unwrap();

    let backend = Arc::new(MemoryBackend::new());
    let stats = Indexer::new(backend.clone(), "scifact")
        .index_corpus(corpus.as_ref(), None)
        .await
        .unwrap();

    assert_eq!(stats.processed, 2);
    assert_eq!(stats.skipped, 3);
    assert_eq!(stats.processed + stats.skipped, stats.total_attempted);
    assert!(backend.document("scifact", "4").is_some());
    assert!(backend.document("scifact", "3").is_none());
}

#[tokio::test]
async fn missing_corpus_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let corpus = open_corpus(
        &CorpusConfig::Jsonl {
            path: dir.path().join("absent.jsonl"),
            mapping: FieldMapping::default(),
        },
        None,
    )
    .unwrap();

    let backend = Arc::new(MemoryBackend::new());
    let result = Indexer::new(backend, "scifact")
        .index_corpus(corpus.as_ref(), None)
        .await;

    assert!(matches!(result, Err(AppError::Corpus(_))));
}

#[tokio::test]
async fn markdown_directory_is_indexed_by_relative_path() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("notes")).unwrap();
    fs::write(
        dir.path().join("notes/statins.md"),
        "---\ntitle: Statin therapy\nurl: https://example.org/statins\n---\n\nStatins **reduce** LDL.\n",
    )
    .unwrap();
    fs::write(dir.path().join("empty.md"), "").unwrap();
    fs::write(dir.path().join("ignored.txt"), "not markdown").unwrap();

    let backend = Arc::new(MemoryBackend::new());
    let stats = Indexer::new(backend.clone(), "notes")
        .index_corpus(&MarkdownCorpus::new(dir.path()), None)
        .await
        .unwrap();

    assert_eq!(stats.processed, 1);
    assert_eq!(stats.skipped, 1);

    let doc = backend.document("notes", "notes/statins.md").unwrap();
    assert_eq!(doc.title, "Statin therapy");
    assert_eq!(doc.url.as_deref(), Some("https://example.org/statins"));
    assert!(doc.text.contains("Statins reduce LDL."));
    assert_eq!(backend.count("notes").await.unwrap(), 1);
}

#[tokio::test]
async fn invalid_utf8_line_is_skipped_and_the_rest_indexed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corpus.jsonl");
    let mut bytes = br#"{"_id": "1", "title": "a", "text": "x"}"#.to_vec();
    bytes.extend_from_slice(b"\n\xff\xfe\n");
    bytes.extend_from_slice(br#"{"_id": "3", "title": "c", "text": "x"}"#);
    bytes.push(b'\n');
    bytes.extend_from_slice(br#"{"_id": "4", "title": "d", "text": "x"}"#);
    fs::write(&path, bytes).unwrap();

    let corpus = open_corpus(
        &CorpusConfig::Jsonl {
            path,
            mapping: FieldMapping::default(),
        },
        None,
    )
    .unwrap();

    let backend = Arc::new(MemoryBackend::new());
    let stats = Indexer::new(backend.clone(), "scifact")
        .index_corpus(corpus.as_ref(), None)
        .await
        .unwrap();

    assert_eq!(stats.processed, 3);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.total_attempted, 4);
}

#[tokio::test]
async fn dataset_outage_mid_run_fails_the_run() {
    let mut server = mockito::Server::new_async().await;
    let rows = serde_json::json!({
        "rows": [
            {"row_idx": 0, "row": {"_id": "1", "title": "a", "text": "x"}},
            {"row_idx": 1, "row": {"_id": "2", "title": "b", "text": "x"}}
        ],
        "num_rows_total": 300
    });
    let _first = server
        .mock("GET", "/rows")
        .match_query(Matcher::UrlEncoded("offset".into(), "0".into()))
        .with_status(200)
        .with_body(rows.to_string())
        .create_async()
        .await;
    let _second = server
        .mock("GET", "/rows")
        .match_query(Matcher::UrlEncoded("offset".into(), "2".into()))
        .with_status(503)
        .create_async()
        .await;

    let corpus = HuggingFaceCorpus::new("BeIR/scifact", "corpus", "corpus")
        .unwrap()
        .with_api_base(&server.url())
        .with_page_size(2);

    let backend = Arc::new(MemoryBackend::new());
    let result = Indexer::new(backend.clone(), "scifact")
        .index_corpus(&corpus, None)
        .await;

    assert!(matches!(result, Err(AppError::Corpus(_))));
    assert_eq!(backend.count("scifact").await.unwrap(), 2);
}
