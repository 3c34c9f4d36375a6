//! OpenAI Whisper transcription implementation.

use super::Transcriber;
use crate::config::{Credentials, TranscriptionSettings};
use crate::error::{CruxError, Result};
use crate::openai::create_client;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info, instrument};

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    max_file_bytes: u64,
}

impl WhisperTranscriber {
    pub fn new(settings: &TranscriptionSettings, credentials: &Credentials) -> Result<Self> {
        let client = create_client(credentials.transcription_key(), settings.api_base.as_deref())?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            max_file_bytes: settings.max_file_bytes,
        })
    }

    /// Reject files the hosted endpoint would refuse anyway.
    async fn check_size(&self, audio_path: &Path) -> Result<u64> {
        let size = tokio::fs::metadata(audio_path)
            .await
            .map_err(|e| {
                CruxError::Transcription(format!("Cannot read {}: {}", audio_path.display(), e))
            })?
            .len();

        if size == 0 {
            return Err(CruxError::Transcription("Audio file is empty".to_string()));
        }
        if size > self.max_file_bytes {
            return Err(CruxError::Transcription(format!(
                "Audio file is {:.1} MB, the transcription service accepts at most {:.1} MB",
                size as f64 / 1_048_576.0,
                self.max_file_bytes as f64 / 1_048_576.0
            )));
        }
        Ok(size)
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let size = self.check_size(audio_path).await?;
        info!("Transcribing {} bytes with {}", size, self.model);

        let file_bytes = tokio::fs::read(audio_path).await.map_err(|e| {
            CruxError::Transcription(format!("Cannot read {}: {}", audio_path.display(), e))
        })?;

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.m4a")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json)
            .build()
            .map_err(|e| CruxError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| CruxError::Transcription(format!("Whisper API error: {}", e)))?;

        let text = response.text.trim().to_string();
        if text.is_empty() {
            return Err(CruxError::Transcription(
                "Whisper returned an empty transcript".to_string(),
            ));
        }

        debug!("Transcribed {} characters", text.len());
        Ok(text)
    }
}
