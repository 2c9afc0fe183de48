// file: src/parser/markdown.rs
// description: flattens markdown bodies into plain text for indexing
// reference: https://docs.rs/pulldown-cmark

use lazy_static::lazy_static;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use regex::Regex;

lazy_static! {
    static ref SPACES: Regex = Regex::new(r"[ \t]+").expect("SPACES regex is valid");
    static ref BLANK_LINES: Regex = Regex::new(r"\n\s*\n+").expect("BLANK_LINES regex is valid");
}

pub struct MarkdownParser;

#[derive(Debug, Clone, Default)]
pub struct ParsedMarkdown {
    pub plain_text: String,
    pub headings: Vec<Heading>,
}

#[derive(Debug, Clone)]
pub struct Heading {
    pub level: u32,
    pub text: String,
}

impl ParsedMarkdown {
    /// Text of the first top-most heading, used as a fallback title.
    pub fn title(&self) -> Option<&str> {
        let top = self.headings.iter().map(|h| h.level).min()?;
        self.headings
            .iter()
            .find(|h| h.level == top)
            .map(|h| h.text.as_str())
            .filter(|text| !text.is_empty())
    }
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, content: &str) -> ParsedMarkdown {
        let mut plain_text = String::new();
        let mut headings = Vec::new();
        let mut current_heading: Option<(u32, String)> = None;

        for event in Parser::new(content) {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    current_heading = Some((level as u32, String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, text)) = current_heading.take() {
                        headings.push(Heading {
                            level,
                            text: text.trim().to_string(),
                        });
                    }
                    plain_text.push('\n');
                }
                Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Item) => {
                    plain_text.push('\n');
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, ref mut heading_text)) = current_heading {
                        heading_text.push_str(&text);
                    }
                    plain_text.push_str(&text);
                }
                Event::SoftBreak | Event::HardBreak => {
                    plain_text.push(' ');
                }
                _ => {}
            }
        }

        ParsedMarkdown {
            plain_text: Self::collapse_whitespace(&plain_text),
            headings,
        }
    }

    fn collapse_whitespace(text: &str) -> String {
        let text = SPACES.replace_all(text, " ");
        let text = BLANK_LINES.replace_all(&text, "\n");
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_parsing() {
        let parser = MarkdownParser::new();
        let parsed = parser.parse("# Title\n\nSome *content*   here.");

        assert_eq!(parsed.headings.len(), 1);
        assert_eq!(parsed.title(), Some("Title"));
        assert_eq!(parsed.plain_text, "Title\nSome content here.");
    }

    #[test]
    fn test_link_keeps_only_its_text() {
        let parsed = MarkdownParser::new().parse("[Example](https://example.com)");

        assert_eq!(parsed.plain_text, "Example");
    }

    #[test]
    fn test_title_prefers_top_level_heading() {
        let parsed = MarkdownParser::new().parse("## Sub\n\n# Main\n\ntext");
        assert_eq!(parsed.title(), Some("Main"));
    }

    #[test]
    fn test_no_heading_means_no_title() {
        let parsed = MarkdownParser::new().parse("just a paragraph");
        assert!(parsed.title().is_none());
    }
}
