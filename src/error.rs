// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Search backend unreachable: {0}")]
    Connection(String),

    #[error("Search backend returned HTTP {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Index '{0}' not found")]
    IndexNotFound(String),

    #[error("Index '{0}' already exists")]
    IndexAlreadyExists(String),

    #[error("Malformed record: {0}")]
    Record(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Maps a transport-level reqwest failure onto the connectivity variant.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            AppError::Connection(err.to_string())
        } else {
            AppError::Http(err)
        }
    }
}
