// file: src/config.rs
// description: application configuration management with toml and env support
// reference: https://docs.rs/config

use crate::corpus::FieldMapping;
use crate::error::{AppError, Result};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable read when no summarizer key is configured explicitly.
pub const HUGGINGFACE_API_KEY_ENV: &str = "HUGGINGFACE_API_KEY";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    pub host: String,
    pub port: u16,
    pub use_ssl: bool,
    pub verify_certs: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub index_name: String,
    pub result_size: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub api_key: Option<String>,
    pub model_id: String,
    pub api_base: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_doc_length: usize,
    pub top_k: usize,
    pub use_cache: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub progress_interval: usize,
}

/// Where the indexer reads its records from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CorpusConfig {
    Jsonl {
        path: PathBuf,
        #[serde(default)]
        mapping: FieldMapping,
    },
    HuggingFace {
        dataset: String,
        #[serde(default = "default_hf_config")]
        config: String,
        #[serde(default = "default_hf_split")]
        split: String,
        #[serde(default = "default_hf_page_size")]
        page_size: usize,
        #[serde(default = "default_hf_api_base")]
        api_base: String,
    },
    Markdown {
        path: PathBuf,
    },
}

fn default_hf_config() -> String {
    "corpus".to_string()
}

fn default_hf_split() -> String {
    "corpus".to_string()
}

fn default_hf_page_size() -> usize {
    100
}

fn default_hf_api_base() -> String {
    "https://datasets-server.huggingface.co".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9200,
            use_ssl: false,
            verify_certs: true,
            username: None,
            password: None,
            index_name: "scifact".to_string(),
            result_size: 10,
            timeout_secs: 30,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model_id: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
            api_base: "https://api-inference.huggingface.co/models".to_string(),
            max_new_tokens: 200,
            temperature: 0.5,
            timeout_secs: 45,
            max_doc_length: 500,
            top_k: 3,
            use_cache: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            progress_interval: 1000,
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        CorpusConfig::HuggingFace {
            dataset: "BeIR/scifact".to_string(),
            config: default_hf_config(),
            split: default_hf_split(),
            page_size: default_hf_page_size(),
            api_base: default_hf_api_base(),
        }
    }
}

impl SearchConfig {
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

impl SummarizerConfig {
    /// The configured key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), self.model_id)
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("ESEMPEHA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config.apply_env_fallbacks();
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        let mut config = Self {
            search: SearchConfig::default(),
            summarizer: SummarizerConfig::default(),
            server: ServerConfig::default(),
            indexer: IndexerConfig::default(),
            corpus: CorpusConfig::default(),
        };
        config.apply_env_fallbacks();
        config
    }

    fn apply_env_fallbacks(&mut self) {
        if self.summarizer.api_key().is_none()
            && let Ok(key) = std::env::var(HUGGINGFACE_API_KEY_ENV)
        {
            self.summarizer.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        Validator::validate_port(self.search.port)?;

        if self.search.index_name.trim().is_empty() {
            return Err(AppError::Config("search.index_name must not be empty".to_string()));
        }

        if self.search.result_size == 0 {
            return Err(AppError::Config(
                "search.result_size must be greater than 0".to_string(),
            ));
        }

        if self.search.timeout_secs == 0 {
            return Err(AppError::Config(
                "search.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Validator::validate_url(&self.summarizer.api_base)?;

        if self.summarizer.timeout_secs == 0 {
            return Err(AppError::Config(
                "summarizer.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.summarizer.max_doc_length == 0 {
            return Err(AppError::Config(
                "summarizer.max_doc_length must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.summarizer.temperature) {
            return Err(AppError::Config(format!(
                "summarizer.temperature must be within 0.0..=2.0, got {}",
                self.summarizer.temperature
            )));
        }

        if self.indexer.progress_interval == 0 {
            return Err(AppError::Config(
                "indexer.progress_interval must be greater than 0".to_string(),
            ));
        }

        if let CorpusConfig::HuggingFace {
            page_size,
            api_base,
            ..
        } = &self.corpus
        {
            Validator::validate_url(api_base)?;
            if *page_size == 0 || *page_size > 100 {
                return Err(AppError::Config(
                    "corpus.page_size must be within 1..=100".to_string(),
                ));
            }
        }

        Ok(())
    }
}
