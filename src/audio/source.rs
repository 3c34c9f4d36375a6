//! Input URL handling.

use crate::error::{CruxError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static VIDEO_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?:https?://)?
        (?:www\.|m\.)?
        (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/|youtube\.com/shorts/|youtube\.com/live/)
        ([a-zA-Z0-9_-]{11})
    ",
    )
    .expect("Invalid regex")
});

/// Check that the input looks like a downloadable web URL.
///
/// An empty input is [`CruxError::MissingUrl`]; anything that is not an
/// http(s) URL is rejected as a download failure.
pub fn validate_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CruxError::MissingUrl);
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| CruxError::Download(format!("Unsupported URL '{}': {}", trimmed, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CruxError::Download(format!(
            "Unsupported URL '{}': only http and https links can be downloaded",
            trimmed
        )));
    }

    Ok(parsed)
}

/// Extract the 11-character video ID from a YouTube URL.
pub fn youtube_video_id(input: &str) -> Option<String> {
    VIDEO_ID_REGEX
        .captures(input.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
