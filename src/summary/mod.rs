//! Cheat sheet summarization.
//!
//! Sends the transcript to a hosted language model with the cheat sheet
//! prompt and returns the generated Markdown unchanged.

mod gemini;
mod openai_chat;

pub use gemini::GeminiSummarizer;
pub use openai_chat::OpenAiSummarizer;

use crate::config::{Credentials, Prompts, SummarizationProvider, SummarizationSettings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for summarization services.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produce cheat sheet Markdown for a transcript.
    async fn summarize(&self, transcript: &str) -> Result<String>;
}

/// Create the summarizer for the configured provider.
pub fn create_summarizer(
    settings: &SummarizationSettings,
    credentials: &Credentials,
    prompts: Prompts,
) -> Result<Arc<dyn Summarizer>> {
    Ok(match settings.provider {
        SummarizationProvider::Gemini => {
            Arc::new(GeminiSummarizer::new(settings, credentials, prompts)?)
        }
        SummarizationProvider::OpenAi => {
            Arc::new(OpenAiSummarizer::new(settings, credentials, prompts)?)
        }
    })
}
