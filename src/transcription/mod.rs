//! Transcription module for CruX.
//!
//! Turns a downloaded audio file into plain transcript text using OpenAI Whisper.

mod whisper;

pub use whisper::WhisperTranscriber;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file and return its text.
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}
