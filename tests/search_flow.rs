// file: tests/search_flow.rs
// description: end-to-end index, search and summarize flow against in-process fakes
// reference: mockito-backed inference endpoint

use esempeha::config::SummarizerConfig;
use esempeha::search::DEFAULT_RESULT_SIZE;
use esempeha::{
    Indexer, JsonlCorpus, MemoryBackend, SchemaManager, SearchBackend, SearchService,
    SummarizationClient, search_documents,
};
use mockito::Matcher;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const STATINS_TEXT: &str = "Statins reduce LDL cholesterol and cardiovascular events.";

fn corpus_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{"_id": "1", "title": "Statins and heart disease", "text": "{}"}}"#,
        STATINS_TEXT
    )
    .unwrap();
    writeln!(
        file,
        r#"{{"_id": "2", "title": "Soil microbes", "text": "Nitrogen fixing bacteria in crop rotation."}}"#
    )
    .unwrap();
    file
}

async fn indexed_backend() -> (Arc<MemoryBackend>, NamedTempFile) {
    let file = corpus_file();
    let backend = Arc::new(MemoryBackend::new());
    let stats = Indexer::new(backend.clone(), "scifact")
        .index_corpus(&JsonlCorpus::new(file.path()), None)
        .await
        .unwrap();
    assert_eq!(stats.processed, 2);
    (backend, file)
}

fn summarizer(api_base: &str) -> SummarizationClient {
    SummarizationClient::new(&SummarizerConfig {
        api_key: Some("hf_test".to_string()),
        model_id: "test/model".to_string(),
        api_base: api_base.to_string(),
        ..SummarizerConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn statins_query_finds_only_the_statins_abstract() {
    let (backend, _file) = indexed_backend().await;

    let hits = search_documents(backend.as_ref(), "scifact", "statins", DEFAULT_RESULT_SIZE)
        .await
        .unwrap();

    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["1"]);
}

#[tokio::test]
async fn summary_request_carries_query_and_excerpt() {
    let (backend, _file) = indexed_backend().await;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/test/model")
        .match_header("authorization", "Bearer hf_test")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"User Query: \\"statins\\""#.to_string()),
            Matcher::Regex(STATINS_TEXT.to_string()),
        ]))
        .with_status(200)
        .with_body(r#"[{"generated_text": " Statins lower LDL cholesterol. "}]"#)
        .expect(1)
        .create_async()
        .await;

    let service = SearchService::new(backend, summarizer(&server.url()), "scifact", 10);
    let page = service.run("statins").await;

    mock.assert_async().await;
    assert_eq!(page.error, None);
    assert_eq!(page.hits.len(), 1);
    assert_eq!(page.summary.as_deref(), Some("Statins lower LDL cholesterol."));
}

#[tokio::test]
async fn rate_limited_summary_keeps_the_hits() {
    let (backend, _file) = indexed_backend().await;

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/test/model")
        .with_status(429)
        .with_body(r#"{"error": "Rate limit reached"}"#)
        .create_async()
        .await;

    let service = SearchService::new(backend, summarizer(&server.url()), "scifact", 10);
    let page = service.run("statins").await;

    assert_eq!(page.hits.len(), 1);
    assert_eq!(
        page.summary.as_deref(),
        Some("LLM service is currently busy (rate limit exceeded). Please try again later.")
    );
}

#[tokio::test]
async fn no_match_sends_nothing_to_the_summarizer() {
    let (backend, _file) = indexed_backend().await;

    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let service = SearchService::new(backend, summarizer(&server.url()), "scifact", 10);
    let page = service.run("photosynthesis").await;

    mock.assert_async().await;
    assert!(page.hits.is_empty());
    assert_eq!(page.error.as_deref(), Some("No results found for your query."));
}

#[tokio::test]
async fn ensure_index_twice_keeps_the_mapping() {
    let backend = MemoryBackend::new();
    let schema = SchemaManager::new(&backend, "scifact");

    assert!(schema.ensure_index().await.unwrap());
    let first = backend.index_body("scifact");
    assert!(!schema.ensure_index().await.unwrap());

    assert_eq!(backend.index_body("scifact"), first);
    assert!(backend.index_exists("scifact").await.unwrap());
}
