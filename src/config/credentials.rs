//! Service credentials, resolved once at startup.

use super::Settings;
use crate::error::{CruxError, Result};

/// API keys for the two hosted services.
///
/// Built once when the process starts and handed to each adapter; nothing
/// reads the environment after that.
#[derive(Clone)]
pub struct Credentials {
    transcription: String,
    summarization: String,
}

impl Credentials {
    pub fn new(transcription: impl Into<String>, summarization: impl Into<String>) -> Self {
        Self {
            transcription: transcription.into(),
            summarization: summarization.into(),
        }
    }

    /// Resolve credentials from the environment, falling back to the config file.
    pub fn resolve(settings: &Settings) -> Result<Self> {
        Self::resolve_with(settings, |name| std::env::var(name).ok())
    }

    /// Resolve credentials using a custom variable lookup.
    pub fn resolve_with<F>(settings: &Settings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_config = |name: &str| match name {
            "OPENAI_API_KEY" => settings.credentials.openai_api_key.clone(),
            "GEMINI_API_KEY" => settings.credentials.gemini_api_key.clone(),
            _ => None,
        };
        let find = |name: &str| {
            lookup(name)
                .or_else(|| from_config(name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let transcription_var = "OPENAI_API_KEY";
        let summarization_var = settings.summarization.provider.api_key_var();

        let transcription = find(transcription_var);
        let summarization = find(summarization_var);

        let mut missing = Vec::new();
        if transcription.is_none() {
            missing.push(transcription_var);
        }
        if summarization.is_none() && summarization_var != transcription_var {
            missing.push(summarization_var);
        }

        match (transcription, summarization) {
            (Some(t), Some(s)) => Ok(Self::new(t, s)),
            _ => Err(CruxError::Config(format!(
                "API key(s) missing: {}. Set them in the environment or in the [credentials] table of {}",
                missing.join(", "),
                Settings::default_config_path().display()
            ))),
        }
    }

    pub fn transcription_key(&self) -> &str {
        &self.transcription
    }

    pub fn summarization_key(&self) -> &str {
        &self.summarization
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("transcription", &"***")
            .field("summarization", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SummarizationProvider;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_resolve_from_environment() {
        let vars = env(&[("OPENAI_API_KEY", "sk-openai"), ("GEMINI_API_KEY", "gm-key")]);
        let creds = Credentials::resolve_with(&Settings::default(), |n| vars.get(n).cloned()).unwrap();

        assert_eq!(creds.transcription_key(), "sk-openai");
        assert_eq!(creds.summarization_key(), "gm-key");
    }

    #[test]
    fn test_missing_keys_is_configuration_error() {
        let err = Credentials::resolve_with(&Settings::default(), |_| None).unwrap_err();

        match err {
            CruxError::Config(msg) => {
                assert!(msg.contains("OPENAI_API_KEY"));
                assert!(msg.contains("GEMINI_API_KEY"));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let vars = env(&[("OPENAI_API_KEY", "sk-openai"), ("GEMINI_API_KEY", "  ")]);
        let err = Credentials::resolve_with(&Settings::default(), |n| vars.get(n).cloned()).unwrap_err();

        assert!(matches!(err, CruxError::Config(ref m) if m.contains("missing: GEMINI_API_KEY.")));
    }

    #[test]
    fn test_config_file_fallback() {
        let mut settings = Settings::default();
        settings.credentials.gemini_api_key = Some("gm-from-file".to_string());
        let vars = env(&[("OPENAI_API_KEY", "sk-openai")]);

        let creds = Credentials::resolve_with(&settings, |n| vars.get(n).cloned()).unwrap();
        assert_eq!(creds.summarization_key(), "gm-from-file");
    }

    #[test]
    fn test_openai_provider_shares_key() {
        let mut settings = Settings::default();
        settings.summarization.provider = SummarizationProvider::OpenAi;
        let vars = env(&[("OPENAI_API_KEY", "sk-openai")]);

        let creds = Credentials::resolve_with(&settings, |n| vars.get(n).cloned()).unwrap();
        assert_eq!(creds.summarization_key(), "sk-openai");
    }

    #[test]
    fn test_debug_redacts_keys() {
        let creds = Credentials::new("sk-secret", "gm-secret");
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("secret"));
    }
}
