// file: src/summarizer/prompt.rs
// description: grounded-answer prompt assembly from the top search hits
// reference: instruction-style prompting for hosted text generation

use crate::models::{SearchHit, truncate_chars};

const INSTRUCTION: &str = "Given the following query and document excerpts, provide a concise answer or summary directly addressing the query. \
Focus on information relevant to the query from the provided texts. \
If the documents do not contain relevant information to answer the query, explicitly state that. \
Do not invent information not present in the excerpts.";

const EMPTY_TEXT: &str = "No abstract available.";
const EMPTY_TITLE: &str = "Document";

/// Builds the prompt for `query` from `hits`, in hit order.
///
/// Each body is cut to `max_doc_length` characters with `...` appended when
/// longer. Callers choose how many hits to pass.
pub fn build_prompt(query: &str, hits: &[SearchHit], max_doc_length: usize) -> String {
    let excerpts = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            let title = if hit.title.trim().is_empty() {
                EMPTY_TITLE
            } else {
                hit.title.as_str()
            };
            format!(
                "Document {} (Title: {}):\n{}",
                i + 1,
                title,
                excerpt(&hit.text, max_doc_length)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{}\n\nUser Query: \"{}\"\n\nDocument Excerpts:\n{}\n\nConcise Answer/Summary:",
        INSTRUCTION, query, excerpts
    )
}

fn excerpt(text: &str, max_doc_length: usize) -> String {
    if text.is_empty() {
        EMPTY_TEXT.to_string()
    } else {
        truncate_chars(text, max_doc_length)
    }
}
