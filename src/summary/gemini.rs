//! Google Gemini summarizer.

use super::Summarizer;
use crate::config::{Credentials, Prompts, SummarizationSettings};
use crate::error::{CruxError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Summarizer backed by the Gemini `generateContent` endpoint.
pub struct GeminiSummarizer {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
    prompts: Prompts,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    status: Option<String>,
}

impl GeminiSummarizer {
    pub fn new(
        settings: &SummarizationSettings,
        credentials: &Credentials,
        prompts: Prompts,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| CruxError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: settings
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: credentials.summarization_key().to_string(),
            model: settings.model(),
            temperature: settings.temperature,
            prompts,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model)
    }
}

/// Join the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(CruxError::Summarization(format!("Prompt was blocked ({reason})")));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| CruxError::Summarization("Gemini returned no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(CruxError::Summarization(format!(
            "Gemini returned an empty response (finish reason: {reason})"
        )));
    }

    Ok(text)
}

/// Human-readable message for a non-success response.
fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(code) => format!("Gemini API error {} ({}): {}", status, code, envelope.error.message),
            None => format!("Gemini API error {}: {}", status, envelope.error.message),
        },
        Err(_) => format!("Gemini API error {}: {}", status, body.trim()),
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    #[instrument(skip(self, transcript), fields(model = %self.model, transcript_chars = transcript.len()))]
    async fn summarize(&self, transcript: &str) -> Result<String> {
        let user_prompt = self.prompts.cheat_sheet_request(transcript);

        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![RequestPart {
                    text: &self.prompts.cheat_sheet.system,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![RequestPart { text: &user_prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        info!("Requesting cheat sheet from Gemini");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CruxError::Summarization(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CruxError::Summarization(format!("Failed to read Gemini response: {e}")))?;

        if !status.is_success() {
            return Err(CruxError::Summarization(api_error_message(status, &body)));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| CruxError::Summarization(format!("Unexpected Gemini response: {e}")))?;

        let text = extract_text(parsed)?;
        debug!("Generated {} characters", text.len());
        Ok(text)
    }
}
