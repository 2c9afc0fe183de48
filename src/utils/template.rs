// file: src/utils/template.rs
// description: placeholder-based HTML page template and escaping
// reference: Internal code standards

use std::collections::HashMap;

/// A page with `{{name}}` placeholders filled from a value map.
///
/// Values are inserted verbatim; callers escape user data with [`escape_html`].
pub struct PageTemplate {
    template: String,
}

impl PageTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The search page served at `/`.
    pub fn index() -> Self {
        Self::new(include_str!("../../templates/index.html"))
    }

    /// Fills placeholders in one pass, so inserted values are never re-expanded.
    pub fn render(&self, values: &HashMap<&str, String>) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            match after.find("}}") {
                Some(end) => {
                    let key = &after[..end];
                    match values.get(key) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
