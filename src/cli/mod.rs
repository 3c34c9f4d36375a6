//! CLI module for CruX.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{Output, StageSpinner};

use clap::{Parser, Subcommand};

/// CruX - Lecture cheat sheets from a video link
///
/// Downloads the audio of a lecture, transcribes it, and turns the transcript
/// into a study cheat sheet with a practice exam, delivered as a PDF.
#[derive(Parser, Debug)]
#[command(name = "crux")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CRUX_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a cheat sheet for one lecture video
    Generate {
        /// Video URL (YouTube or any site yt-dlp supports)
        url: String,

        /// Where to write the PDF (default: ./CruX_CheatSheet.pdf)
        #[arg(short, long)]
        output: Option<String>,

        /// Also print the Markdown summary to stdout
        #[arg(long)]
        print: bool,
    },

    /// Start the web interface and JSON API
    Serve {
        /// Host to bind to (overrides [server].host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides [server].port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
