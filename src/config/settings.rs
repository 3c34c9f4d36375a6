//! Configuration settings for CruX.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub download: DownloadSettings,
    pub transcription: TranscriptionSettings,
    pub summarization: SummarizationSettings,
    pub render: RenderSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
    pub credentials: CredentialSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for temporary audio files.
    pub temp_dir: String,
    /// Log level when no -v flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/crux".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Audio download settings (yt-dlp).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Path or name of the yt-dlp executable.
    pub ytdlp_path: String,
    /// yt-dlp format selector.
    pub format: String,
    /// Codec the audio is extracted to.
    pub audio_format: String,
    /// Client identity sent to the source host.
    pub user_agent: String,
    /// Skip TLS certificate validation in yt-dlp.
    pub skip_certificate_check: bool,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            format: "m4a/bestaudio/best".to_string(),
            audio_format: "m4a".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"
                .to_string(),
            skip_certificate_check: true,
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model to use.
    pub model: String,
    /// Override for the OpenAI API base URL.
    pub api_base: Option<String>,
    /// Largest audio upload accepted by the hosted endpoint.
    pub max_file_bytes: u64,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            api_base: None,
            max_file_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Summarization provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SummarizationProvider {
    /// Google Gemini (default).
    #[default]
    Gemini,
    /// OpenAI chat completions.
    OpenAi,
}

impl SummarizationProvider {
    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            SummarizationProvider::Gemini => "gemini-1.5-flash",
            SummarizationProvider::OpenAi => "gpt-4o-mini",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            SummarizationProvider::Gemini => "GEMINI_API_KEY",
            SummarizationProvider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl std::str::FromStr for SummarizationProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(SummarizationProvider::Gemini),
            "openai" => Ok(SummarizationProvider::OpenAi),
            _ => Err(format!("Unknown summarization provider: {}", s)),
        }
    }
}

impl std::fmt::Display for SummarizationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummarizationProvider::Gemini => write!(f, "gemini"),
            SummarizationProvider::OpenAi => write!(f, "openai"),
        }
    }
}

/// Summarization service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationSettings {
    /// Summarization provider (gemini, openai).
    pub provider: SummarizationProvider,
    /// Model name. Falls back to the provider default when unset.
    pub model: Option<String>,
    /// Override for the provider API base URL.
    pub api_base: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// HTTP request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for SummarizationSettings {
    fn default() -> Self {
        Self {
            provider: SummarizationProvider::Gemini,
            model: None,
            api_base: None,
            temperature: 0.7,
            timeout_seconds: 300,
        }
    }
}

impl SummarizationSettings {
    /// The configured model, or the provider default.
    pub fn model(&self) -> String {
        self.model
            .as_ref()
            .filter(|m| !m.is_empty())
            .cloned()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }
}

/// PDF rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Document title stored in the PDF metadata.
    pub title: String,
    /// Body text size in points.
    pub font_size: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            title: "CruX Cheat Sheet".to_string(),
            font_size: 11.0,
        }
    }
}

/// Web server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

/// API keys from the config file. Environment variables take precedence.
#[derive(Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CredentialSettings {
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,
}

impl std::fmt::Debug for CredentialSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSettings")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::CruxError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("crux")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}
