// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{AppError, Result};
use std::net::SocketAddr;
use std::path::Path;

pub struct Validator;

impl Validator {
    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(AppError::Validation(format!(
                "Directory does not exist: {}",
                path.display()
            )));
        }

        if !path.is_dir() {
            return Err(AppError::Validation(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn validate_markdown_extension(path: &Path) -> Result<()> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") | Some("markdown") => Ok(()),
            _ => Err(AppError::Validation(format!(
                "File is not a markdown file: {}",
                path.display()
            ))),
        }
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn validate_port(port: u16) -> Result<()> {
        if port == 0 {
            return Err(AppError::Validation("Port cannot be 0".to_string()));
        }
        Ok(())
    }

    pub fn parse_bind_address(bind: &str) -> Result<SocketAddr> {
        bind.parse().map_err(|e| {
            AppError::Validation(format!("Invalid bind address {}: {}", bind, e))
        })
    }

    /// Trims the incoming query; `None` when nothing searchable is left.
    pub fn normalize_query(query: Option<&str>) -> Option<String> {
        query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_directory() {
        let temp = TempDir::new().unwrap();
        assert!(Validator::validate_directory(temp.path()).is_ok());
        assert!(Validator::validate_directory(Path::new("/nonexistent")).is_err());
    }

    #[test]
    fn test_validate_markdown_extension() {
        assert!(Validator::validate_markdown_extension(Path::new("test.md")).is_ok());
        assert!(Validator::validate_markdown_extension(Path::new("test.markdown")).is_ok());
        assert!(Validator::validate_markdown_extension(Path::new("test.txt")).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(Validator::validate_url("https://example.com").is_ok());
        assert!(Validator::validate_url("http://example.com").is_ok());
        assert!(Validator::validate_url("example.com").is_err());
        assert!(Validator::validate_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_port() {
        assert!(Validator::validate_port(9200).is_ok());
        assert!(Validator::validate_port(0).is_err());
    }

    #[test]
    fn test_parse_bind_address() {
        assert!(Validator::parse_bind_address("127.0.0.1:8000").is_ok());
        assert!(Validator::parse_bind_address("localhost").is_err());
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(Validator::normalize_query(Some("  statins ")), Some("statins".to_string()));
        assert_eq!(Validator::normalize_query(Some("   ")), None);
        assert_eq!(Validator::normalize_query(None), None);
    }
}
