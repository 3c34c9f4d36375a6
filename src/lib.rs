//! CruX - Lecture cheat sheets from a video link
//!
//! Give CruX the URL of a recorded lecture and it returns a study cheat sheet:
//! a summary, the core concepts, key terms and a short practice exam with an
//! answer key, rendered as a downloadable PDF.
//!
//! # Architecture
//!
//! Each request runs as one job through four stages, strictly in order:
//!
//! - `audio` - Download the audio track with yt-dlp into a temporary file
//! - `transcription` - Speech-to-text with OpenAI Whisper
//! - `summary` - Cheat sheet generation with Gemini (or OpenAI chat)
//! - `render` - Markdown to PDF and HTML
//!
//! `pipeline` drives a job through the stages and owns the temporary audio
//! file. `config` holds settings, credentials and prompt templates, and `cli`
//! exposes the pipeline as a command line tool and a small web server.
//!
//! # Example
//!
//! ```rust,no_run
//! use crux::config::{Credentials, Prompts, Settings};
//! use crux::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let credentials = Credentials::resolve(&settings)?;
//!     let prompts = Prompts::load(None, None)?;
//!     let pipeline = Pipeline::new(&settings, &credentials, prompts)?;
//!
//!     let job = pipeline.submit("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
//!     match job.outcome() {
//!         Ok(sheet) => std::fs::write(sheet.filename(), &sheet.document)?,
//!         Err(failure) => eprintln!("{}", failure),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod pipeline;
pub mod render;
pub mod summary;
pub mod transcription;

pub use error::{CruxError, Result};
