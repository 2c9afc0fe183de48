// file: src/parser/frontmatter.rs
// description: YAML front matter extraction from markdown corpus files
// reference: https://docs.rs/yaml-rust

use crate::error::{AppError, Result};
use std::collections::HashMap;
use yaml_rust::{Yaml, YamlLoader};

pub struct FrontmatterParser;

#[derive(Debug, Clone, Default)]
pub struct Frontmatter {
    pub fields: HashMap<String, String>,
}

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

impl FrontmatterParser {
    pub fn new() -> Self {
        Self
    }

    /// Splits a leading `---` YAML block from the body.
    ///
    /// Content without front matter comes back unchanged with empty fields.
    pub fn extract(&self, content: &str) -> Result<(Frontmatter, String)> {
        let Some(rest) = content.strip_prefix("---") else {
            return Ok((Frontmatter::default(), content.to_string()));
        };

        let Some((yaml_content, body)) = rest.split_once("\n---") else {
            return Ok((Frontmatter::default(), content.to_string()));
        };

        let docs = YamlLoader::load_from_str(yaml_content)
            .map_err(|e| AppError::Record(format!("YAML front matter parse error: {}", e)))?;

        let mut fields = HashMap::new();

        if let Some(Yaml::Hash(hash)) = docs.first() {
            for (key, value) in hash {
                let (Yaml::String(k), Some(v)) = (key, scalar_to_string(value)) else {
                    continue;
                };
                fields.insert(k.clone(), v);
            }
        }

        Ok((Frontmatter { fields }, body.trim().to_string()))
    }
}

fn scalar_to_string(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) | Yaml::Real(s) => Some(s.clone()),
        Yaml::Integer(i) => Some(i.to_string()),
        Yaml::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

impl Default for FrontmatterParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontmatter_extraction() {
        let parser = FrontmatterParser::new();
        let content = "---\ntitle: Test\nyear: 2024\n---\n\n# Content";

        let (frontmatter, body) = parser.extract(content).unwrap();
        assert_eq!(frontmatter.get("title"), Some("Test"));
        assert_eq!(frontmatter.get("year"), Some("2024"));
        assert_eq!(body, "# Content");
    }

    #[test]
    fn test_no_frontmatter() {
        let parser = FrontmatterParser::new();
        let content = "# Just a heading";

        let (frontmatter, body) = parser.extract(content).unwrap();
        assert!(frontmatter.fields.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let parser = FrontmatterParser::new();
        assert!(parser.extract("---\ntitle: [unclosed\n---\nbody").is_err());
    }

    #[test]
    fn test_blank_field_reads_as_missing() {
        let parser = FrontmatterParser::new();
        let (frontmatter, _) = parser.extract("---\nurl: ''\n---\nbody").unwrap();
        assert_eq!(frontmatter.get("url"), None);
    }
}
