//! Error types for CruX.

use crate::pipeline::Stage;
use thiserror::Error;

/// Library-level error type for CruX operations.
#[derive(Error, Debug)]
pub enum CruxError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Paste a link first!")]
    MissingUrl,

    #[error("Audio download failed: {0}")]
    Download(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Document rendering failed: {0}")]
    Render(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CruxError {
    /// The pipeline stage this error belongs to, if it is a stage error.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            CruxError::Download(_) | CruxError::ToolNotFound(_) => Some(Stage::Fetch),
            CruxError::Transcription(_) => Some(Stage::Transcribe),
            CruxError::Summarization(_) => Some(Stage::Summarize),
            CruxError::Render(_) => Some(Stage::Render),
            _ => None,
        }
    }
}

/// Result type alias for CruX operations.
pub type Result<T> = std::result::Result<T, CruxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        assert_eq!(CruxError::Download("x".into()).stage(), Some(Stage::Fetch));
        assert_eq!(CruxError::ToolNotFound("yt-dlp".into()).stage(), Some(Stage::Fetch));
        assert_eq!(CruxError::Transcription("x".into()).stage(), Some(Stage::Transcribe));
        assert_eq!(CruxError::Summarization("x".into()).stage(), Some(Stage::Summarize));
        assert_eq!(CruxError::Render("x".into()).stage(), Some(Stage::Render));
        assert_eq!(CruxError::Config("x".into()).stage(), None);
        assert_eq!(CruxError::MissingUrl.stage(), None);
    }
}
