//! Configuration module for CruX.
//!
//! Handles loading application settings, prompt templates and service credentials.

mod credentials;
mod prompts;
mod settings;

pub use credentials::Credentials;
pub use prompts::{CheatSheetPrompts, Prompts, QUIZ_QUESTIONS};
pub use settings::{
    CredentialSettings, DownloadSettings, GeneralSettings, PromptSettings, RenderSettings,
    ServerSettings, Settings, SummarizationProvider, SummarizationSettings, TranscriptionSettings,
};
