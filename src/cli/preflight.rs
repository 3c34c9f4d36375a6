//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and credentials are available before a job
//! starts, so nothing fails midway after the audio is already downloaded.

use crate::config::{Credentials, Settings};
use crate::error::{CruxError, Result};
use std::process::Command;

/// Run pre-flight checks before `generate` or `serve`.
///
/// Both need yt-dlp, ffmpeg and every API key. Returns the resolved
/// credentials if all checks pass.
pub fn check(settings: &Settings) -> Result<Credentials> {
    let credentials = Credentials::resolve(settings)?;
    check_tool(&settings.download.ytdlp_path)?;
    check_tool("ffmpeg")?;
    Ok(credentials)
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    // ffmpeg uses -version (single dash), others use --version
    let version_arg = if name.ends_with("ffmpeg") { "-version" } else { "--version" };

    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(CruxError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(CruxError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(CruxError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
