// file: src/web/render.rs
// description: HTML rendering of a search page through the page template
// reference: server-side rendered results page

use crate::models::SearchHit;
use crate::service::SearchPage;
use crate::utils::{PageTemplate, escape_html};
use std::collections::HashMap;

pub const ENGINE_NAME: &str = "ESEMPEHA Search";

pub fn render_page(page: &SearchPage) -> String {
    let mut values = HashMap::new();
    values.insert("engine_name", ENGINE_NAME.to_string());
    values.insert("query", escape_html(&page.query));
    values.insert(
        "error",
        page.error
            .as_deref()
            .map(|e| format!(r#"<div class="error">{}</div>"#, escape_html(e)))
            .unwrap_or_default(),
    );
    values.insert(
        "summary",
        page.summary
            .as_deref()
            .map(|s| {
                format!(
                    r#"<div class="summary"><strong>Summary</strong><p>{}</p></div>"#,
                    escape_html(s)
                )
            })
            .unwrap_or_default(),
    );
    values.insert("results", render_hits(&page.hits));

    PageTemplate::index().render(&values)
}

fn render_hits(hits: &[SearchHit]) -> String {
    hits.iter().map(render_hit).collect::<Vec<_>>().join("\n")
}

fn render_hit(hit: &SearchHit) -> String {
    let title = if hit.title.is_empty() { &hit.id } else { &hit.title };
    let link = hit
        .url
        .as_deref()
        .map(|url| {
            let url = escape_html(url);
            format!(r#"<a href="{url}">{url}</a>"#)
        })
        .unwrap_or_default();

    format!(
        r#"<div class="hit"><h3>{}</h3><p>{}</p>{}</div>"#,
        escape_html(title),
        escape_html(&hit.text),
        link
    )
}
