// file: src/search/client.rs
// description: OpenSearch REST client wrapper with connection management
// reference: https://opensearch.org/docs/latest/api-reference/

use crate::config::SearchConfig;
use crate::error::{AppError, Result};
use crate::models::Document;
use crate::search::backend::{QueryResponse, SearchBackend};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct OpenSearchClient {
    http: Client,
    base_url: Url,
    credentials: Option<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

impl OpenSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let base = config.base_url();
        info!("Configuring OpenSearch client for {}", base);

        let base_url = Url::parse(&base)
            .map_err(|e| AppError::Config(format!("Invalid search backend URL {}: {}", base, e)))?;

        if !config.verify_certs {
            warn!("TLS certificate verification disabled for {}", base);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_certs)
            .build()?;

        let credentials = config
            .credentials()
            .map(|(user, pass)| (user.to_string(), pass.to_string()));

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("{} cannot be used as a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let builder = self.http.request(method, self.url(segments)?);
        Ok(match &self.credentials {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        })
    }

    async fn send(builder: RequestBuilder) -> Result<Response> {
        builder.send().await.map_err(AppError::from_transport)
    }

    /// Translate a non-success response into the matching error variant.
    async fn error_from(index: &str, response: Response) -> AppError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        let parsed = serde_json::from_str::<ErrorEnvelope>(&text).ok();
        let kind = parsed
            .as_ref()
            .map(|e| e.error.kind.clone())
            .unwrap_or_default();

        match kind.as_str() {
            "resource_already_exists_exception" => AppError::IndexAlreadyExists(index.to_string()),
            "index_not_found_exception" => AppError::IndexNotFound(index.to_string()),
            _ if status == StatusCode::NOT_FOUND => AppError::IndexNotFound(index.to_string()),
            _ => {
                let message = match parsed {
                    Some(e) if !e.error.reason.is_empty() => {
                        format!("{}: {}", e.error.kind, e.error.reason)
                    }
                    _ => text,
                };
                AppError::Backend {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}

#[async_trait]
impl SearchBackend for OpenSearchClient {
    fn endpoint(&self) -> String {
        self.base_url.to_string()
    }

    async fn ping(&self) -> bool {
        debug!("Checking OpenSearch connection");

        let builder = match self.request(Method::GET, &[]) {
            Ok(builder) => builder,
            Err(e) => {
                warn!("Cannot build ping request: {}", e);
                return false;
            }
        };

        match Self::send(builder).await {
            Ok(response) if response.status().is_success() => {
                info!("OpenSearch connection successful");
                true
            }
            Ok(response) => {
                warn!("OpenSearch ping returned HTTP {}", response.status());
                false
            }
            Err(e) => {
                warn!("OpenSearch connection failed: {}", e);
                false
            }
        }
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = Self::send(self.request(Method::HEAD, &[index])?).await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(AppError::Backend {
                status: status.as_u16(),
                message: format!("Failed to check index {}", index),
            }),
        }
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<()> {
        let response = Self::send(self.request(Method::PUT, &[index])?.json(body)).await?;

        if response.status().is_success() {
            info!("Index '{}' created successfully", index);
            return Ok(());
        }

        Err(Self::error_from(index, response).await)
    }

    async fn upsert(&self, index: &str, id: &str, document: &Document) -> Result<()> {
        let response =
            Self::send(self.request(Method::PUT, &[index, "_doc", id])?.json(document)).await?;

        if response.status().is_success() {
            debug!("Indexed document {} into {}", id, index);
            return Ok(());
        }

        Err(Self::error_from(index, response).await)
    }

    async fn query(&self, index: &str, body: &Value) -> Result<QueryResponse> {
        let response =
            Self::send(self.request(Method::POST, &[index, "_search"])?.json(body)).await?;

        if !response.status().is_success() {
            return Err(Self::error_from(index, response).await);
        }

        let text = response.text().await.map_err(AppError::from_transport)?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn refresh(&self, index: &str) -> Result<()> {
        let response = Self::send(self.request(Method::POST, &[index, "_refresh"])?).await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(Self::error_from(index, response).await)
    }

    async fn count(&self, index: &str) -> Result<u64> {
        let response = Self::send(self.request(Method::GET, &[index, "_count"])?).await?;

        if !response.status().is_success() {
            return Err(Self::error_from(index, response).await);
        }

        let count: CountResponse = response.json().await?;
        Ok(count.count)
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        let response = Self::send(self.request(Method::DELETE, &[index])?).await?;

        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            info!("Index '{}' deleted", index);
            return Ok(());
        }

        Err(Self::error_from(index, response).await)
    }
}
