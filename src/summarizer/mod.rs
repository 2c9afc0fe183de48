// file: src/summarizer/mod.rs
// description: LLM summarization module exports
// reference: internal module structure

mod client;
mod prompt;

pub use client::{MSG_API_KEY_MISSING, MSG_NO_DOCUMENTS, SummarizationClient, SummaryFailure};
pub use prompt::build_prompt;
