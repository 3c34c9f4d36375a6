//! OpenAI chat completion summarizer.

use super::Summarizer;
use crate::config::{Credentials, Prompts, SummarizationSettings};
use crate::error::{CruxError, Result};
use crate::openai::create_client_with_timeout;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Summarizer backed by an OpenAI chat model.
pub struct OpenAiSummarizer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    prompts: Prompts,
}

impl OpenAiSummarizer {
    pub fn new(
        settings: &SummarizationSettings,
        credentials: &Credentials,
        prompts: Prompts,
    ) -> Result<Self> {
        let client = create_client_with_timeout(
            credentials.summarization_key(),
            settings.api_base.as_deref(),
            Duration::from_secs(settings.timeout_seconds),
        )?;

        Ok(Self {
            client,
            model: settings.model(),
            temperature: settings.temperature,
            prompts,
        })
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    #[instrument(skip(self, transcript), fields(model = %self.model, transcript_chars = transcript.len()))]
    async fn summarize(&self, transcript: &str) -> Result<String> {
        info!("Requesting cheat sheet from OpenAI");

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.cheat_sheet.system.clone())
                .build()
                .map_err(|e| CruxError::Summarization(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(self.prompts.cheat_sheet_request(transcript))
                .build()
                .map_err(|e| CruxError::Summarization(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| CruxError::Summarization(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            CruxError::Summarization(format!("OpenAI API error: {}", e))
        })?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| CruxError::Summarization("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated {} characters", text.len());
        Ok(text)
    }
}
