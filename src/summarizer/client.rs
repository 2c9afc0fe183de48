// file: src/summarizer/client.rs
// description: hosted inference API client that turns search hits into a short answer
// reference: https://huggingface.co/docs/api-inference

use crate::config::SummarizerConfig;
use crate::error::Result;
use crate::models::SearchHit;
use crate::summarizer::prompt::build_prompt;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const MSG_API_KEY_MISSING: &str = "LLM summarization is unavailable (API key missing).";
pub const MSG_NO_DOCUMENTS: &str = "No documents provided for summarization.";

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
    options: GenerationOptions,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
    wait_for_model: bool,
}

#[derive(Debug, Serialize)]
struct GenerationOptions {
    use_cache: bool,
}

/// Every way a summary request can fall short of generated text.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryFailure {
    MissingApiKey,
    NoDocuments,
    UnexpectedFormat,
    Unauthorized,
    RateLimited,
    ServerError(u16),
    HttpStatus(u16),
    Timeout,
    Transport,
    Unexpected,
}

impl SummaryFailure {
    /// The message shown to the user in place of a summary.
    pub fn message(&self) -> String {
        match self {
            Self::MissingApiKey => MSG_API_KEY_MISSING.to_string(),
            Self::NoDocuments => MSG_NO_DOCUMENTS.to_string(),
            Self::UnexpectedFormat => {
                "Could not generate summary due to API response format.".to_string()
            }
            Self::Unauthorized => "LLM API request failed: Unauthorized (check API key).".to_string(),
            Self::RateLimited => {
                "LLM service is currently busy (rate limit exceeded). Please try again later."
                    .to_string()
            }
            Self::ServerError(code) => format!(
                "LLM service unavailable (server error {}). Please try again later.",
                code
            ),
            Self::HttpStatus(code) => format!("Failed to get summary from LLM (HTTP {}).", code),
            Self::Timeout => "LLM request timed out. Please try again.".to_string(),
            Self::Transport => {
                "Failed to get summary from LLM due to a connection or API error.".to_string()
            }
            Self::Unexpected => {
                "An unexpected error occurred while generating the summary.".to_string()
            }
        }
    }

    fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 => Self::Unauthorized,
            429 => Self::RateLimited,
            code if code >= 500 => Self::ServerError(code),
            code => Self::HttpStatus(code),
        }
    }

    fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport
        }
    }
}

#[derive(Clone)]
pub struct SummarizationClient {
    http: Client,
    config: SummarizerConfig,
}

impl SummarizationClient {
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Whether a key is configured; without one no request is ever sent.
    pub fn is_enabled(&self) -> bool {
        self.config.api_key().is_some()
    }

    /// Summary text for `query` over the top hits, or a user-facing failure message.
    pub async fn summarize(&self, query: &str, hits: &[SearchHit]) -> String {
        match self.try_summarize(query, hits).await {
            Ok(summary) => summary,
            Err(failure) => failure.message(),
        }
    }

    pub async fn try_summarize(
        &self,
        query: &str,
        hits: &[SearchHit],
    ) -> std::result::Result<String, SummaryFailure> {
        let Some(api_key) = self.config.api_key() else {
            warn!("Summarizer API key not configured. LLM summarization disabled.");
            return Err(SummaryFailure::MissingApiKey);
        };

        if hits.is_empty() {
            return Err(SummaryFailure::NoDocuments);
        }

        let top = &hits[..hits.len().min(self.config.top_k.max(1))];
        let prompt = build_prompt(query, top, self.config.max_doc_length);

        let request = GenerationRequest {
            inputs: &prompt,
            parameters: GenerationParameters {
                max_new_tokens: self.config.max_new_tokens,
                temperature: self.config.temperature,
                return_full_text: false,
                wait_for_model: true,
            },
            options: GenerationOptions {
                use_cache: self.config.use_cache,
            },
        };

        info!(
            "Sending request to LLM {} for query '{}' with {} documents",
            self.config.model_id,
            query,
            top.len()
        );

        let response = self
            .http
            .post(self.config.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("LLM API request failed for query '{}': {}", query, e);
                SummaryFailure::from_transport(&e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read LLM API response for query '{}': {}", query, e);
            SummaryFailure::from_transport(&e)
        })?;

        if status != StatusCode::OK {
            error!(
                "LLM API request failed for query '{}' with status {}: {}",
                query, status, body
            );
            return Err(SummaryFailure::from_status(status));
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            error!("LLM API returned a non-JSON body for query '{}': {}", query, e);
            SummaryFailure::Unexpected
        })?;

        match generated_text(&value) {
            Some(text) => {
                let summary = text.trim().to_string();
                debug!("LLM summary received for query '{}': {} chars", query, summary.len());
                Ok(summary)
            }
            None => {
                error!("Unexpected LLM API response format for query '{}': {}", query, value);
                Err(SummaryFailure::UnexpectedFormat)
            }
        }
    }
}

/// `generated_text` of the first element of a `[{"generated_text": ...}]` reply.
fn generated_text(value: &Value) -> Option<&str> {
    value.as_array()?.first()?.get("generated_text")?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use mockito::Matcher;
    use serde_json::json;

    fn config(api_base: &str, api_key: Option<&str>) -> SummarizerConfig {
        SummarizerConfig {
            api_key: api_key.map(str::to_string),
            model_id: "test/model".to_string(),
            api_base: api_base.to_string(),
            ..SummarizerConfig::default()
        }
    }

    fn hits() -> Vec<SearchHit> {
        vec![SearchHit::from_source(
            "1",
            Document::new("1", "Statins", "Statins reduce LDL cholesterol."),
            Some(1.0),
        )]
    }

    async fn respond_with(status: usize, body: &str) -> String {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/test/model")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = SummarizationClient::new(&config(&server.url(), Some("hf_test"))).unwrap();
        let summary = client.summarize("statins", &hits()).await;
        mock.assert_async().await;
        summary
    }

    #[tokio::test]
    async fn test_missing_key_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

        let client = SummarizationClient::new(&config(&server.url(), Some("  "))).unwrap();
        assert!(!client.is_enabled());
        assert_eq!(client.summarize("statins", &hits()).await, MSG_API_KEY_MISSING);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_hits_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

        let client = SummarizationClient::new(&config(&server.url(), Some("hf_test"))).unwrap();
        assert_eq!(client.summarize("statins", &[]).await, MSG_NO_DOCUMENTS);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_request_shape_and_generated_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/test/model")
            .match_header("authorization", "Bearer hf_test")
            .match_body(Matcher::PartialJson(json!({
                "parameters": {
                    "max_new_tokens": 200,
                    "temperature": 0.5,
                    "return_full_text": false,
                    "wait_for_model": true
                },
                "options": {"use_cache": false}
            })))
            .with_status(200)
            .with_body(r#"[{"generated_text": "  Statins lower LDL.  "}]"#)
            .create_async()
            .await;

        let client = SummarizationClient::new(&config(&server.url(), Some("hf_test"))).unwrap();
        assert_eq!(client.summarize("statins", &hits()).await, "Statins lower LDL.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_only_top_k_hits_are_sent() {
        let mut server = mockito::Server::new_async().await;
        // the third excerpt must be the last one before the closing cue
        let mock = server
            .mock("POST", "/test/model")
            .match_body(Matcher::Regex(
                r"Document 3 \(Title: t3\):\\nbody\\n\\nConcise Answer/Summary:".to_string(),
            ))
            .with_status(200)
            .with_body(r#"[{"generated_text": "ok"}]"#)
            .create_async()
            .await;

        let many: Vec<SearchHit> = (1..=5)
            .map(|i| {
                let id = i.to_string();
                SearchHit::from_source(&id, Document::new(&id, format!("t{i}"), "body"), None)
            })
            .collect();

        let client = SummarizationClient::new(&config(&server.url(), Some("hf_test"))).unwrap();
        assert_eq!(client.summarize("q", &many).await, "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized() {
        assert_eq!(
            respond_with(401, "{}").await,
            "LLM API request failed: Unauthorized (check API key)."
        );
    }

    #[tokio::test]
    async fn test_rate_limited() {
        assert_eq!(
            respond_with(429, r#"{"error": "busy"}"#).await,
            "LLM service is currently busy (rate limit exceeded). Please try again later."
        );
    }

    #[tokio::test]
    async fn test_server_error() {
        assert_eq!(
            respond_with(503, "{}").await,
            "LLM service unavailable (server error 503). Please try again later."
        );
    }

    #[tokio::test]
    async fn test_other_status() {
        assert_eq!(
            respond_with(404, "{}").await,
            "Failed to get summary from LLM (HTTP 404)."
        );
    }

    #[tokio::test]
    async fn test_unexpected_shape() {
        assert_eq!(
            respond_with(200, r#"{"generated_text": "not a list"}"#).await,
            "Could not generate summary due to API response format."
        );
        assert_eq!(
            respond_with(200, "[]").await,
            "Could not generate summary due to API response format."
        );
    }

    #[tokio::test]
    async fn test_non_json_body() {
        assert_eq!(
            respond_with(200, "<html>gateway</html>").await,
            "An unexpected error occurred while generating the summary."
        );
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let client = SummarizationClient::new(&config("http://127.0.0.1:1", Some("hf_test"))).unwrap();
        assert_eq!(
            client.summarize("statins", &hits()).await,
            "Failed to get summary from LLM due to a connection or API error."
        );
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // accept and hold connections without ever answering
        let silent = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = SummarizationClient::new(&SummarizerConfig {
            timeout_secs: 1,
            ..config(&format!("http://{}", addr), Some("hf_test"))
        })
        .unwrap();

        assert_eq!(
            client.summarize("statins", &hits()).await,
            "LLM request timed out. Please try again."
        );
        silent.abort();
    }
}
