//! Audio download via yt-dlp.

use super::{validate_url, youtube_video_id, AudioFetcher, AudioFile};
use crate::config::DownloadSettings;
use crate::error::{CruxError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, instrument};
use uuid::Uuid;

/// Downloads a single video's audio track with yt-dlp.
pub struct YtDlpFetcher {
    settings: DownloadSettings,
    output_dir: PathBuf,
}

impl YtDlpFetcher {
    pub fn new(settings: DownloadSettings, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            output_dir: output_dir.into(),
        }
    }

    /// File stem shared by every file a job writes.
    fn file_stem(job_id: Uuid) -> String {
        format!("crux-{}", job_id)
    }

    /// Command-line arguments for one download.
    fn build_args(&self, url: &str, template: &Path) -> Vec<String> {
        let mut args = vec![
            "--format".to_string(),
            self.settings.format.clone(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            self.settings.audio_format.clone(),
            "--output".to_string(),
            template.to_string_lossy().into_owned(),
            "--no-playlist".to_string(),
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--add-header".to_string(),
            format!("User-Agent:{}", self.settings.user_agent),
        ];

        if self.settings.skip_certificate_check {
            args.push("--no-check-certificate".to_string());
        }

        args.push("--".to_string());
        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl AudioFetcher for YtDlpFetcher {
    #[instrument(skip(self), fields(video_id = tracing::field::Empty))]
    async fn fetch(&self, url: &str, job_id: Uuid) -> Result<AudioFile> {
        let url = validate_url(url)?;
        if let Some(id) = youtube_video_id(url.as_str()) {
            tracing::Span::current().record("video_id", id.as_str());
        }

        std::fs::create_dir_all(&self.output_dir)?;

        let stem = Self::file_stem(job_id);
        let template = self.output_dir.join(format!("{}.%(ext)s", stem));
        let audio = AudioFile::new(
            self.output_dir
                .join(format!("{}.{}", stem, self.settings.audio_format)),
        );

        info!("Downloading audio from {}", url);

        let result = Command::new(&self.settings.ytdlp_path)
            .args(self.build_args(url.as_str(), &template))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CruxError::ToolNotFound(self.settings.ytdlp_path.clone()));
            }
            Err(e) => {
                return Err(CruxError::Download(format!("yt-dlp execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(CruxError::Download(if detail.is_empty() {
                format!("yt-dlp exited with {}", output.status)
            } else {
                format!("yt-dlp failed: {detail}")
            }));
        }

        if !audio.path().exists() {
            return Err(CruxError::Download("Audio file not found after download".into()));
        }

        info!("Audio saved to {}", audio.path().display());
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(dir: &Path, ytdlp_path: &str) -> YtDlpFetcher {
        let settings = DownloadSettings {
            ytdlp_path: ytdlp_path.to_string(),
            ..DownloadSettings::default()
        };
        YtDlpFetcher::new(settings, dir)
    }

    #[test]
    fn test_build_args_are_conservative() {
        let fetcher = fetcher(Path::new("/tmp/crux"), "yt-dlp");
        let args = fetcher.build_args(
            "https://youtu.be/dQw4w9WgXcQ",
            Path::new("/tmp/crux/crux-1.%(ext)s"),
        );

        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(args.contains(&"--no-check-certificate".to_string()));
        assert!(args.iter().any(|a| a.starts_with("User-Agent:Mozilla/5.0")));
        assert_eq!(args[args.len() - 2], "--");
        assert_eq!(args.last().unwrap(), "https://youtu.be/dQw4w9WgXcQ");

        let format_idx = args.iter().position(|a| a == "--format").unwrap();
        assert_eq!(args[format_idx + 1], "m4a/bestaudio/best");
    }

    #[test]
    fn test_certificate_check_kept_when_configured() {
        let settings = DownloadSettings {
            skip_certificate_check: false,
            ..DownloadSettings::default()
        };
        let fetcher = YtDlpFetcher::new(settings, "/tmp/crux");
        let args = fetcher.build_args("https://example.com/v", Path::new("/tmp/t"));
        assert!(!args.contains(&"--no-check-certificate".to_string()));
    }

    #[test]
    fn test_file_names_are_unique_per_job() {
        let a = YtDlpFetcher::file_stem(Uuid::new_v4());
        let b = YtDlpFetcher::file_stem(Uuid::new_v4());
        assert_ne!(a, b);
        assert!(a.starts_with("crux-"));
    }

    #[tokio::test]
    async fn test_invalid_url_never_spawns_tool() {
        let dir = tempfile::tempdir().unwrap();
        // A missing binary would surface as ToolNotFound if it were spawned
        let fetcher = fetcher(dir.path(), "/nonexistent/yt-dlp");

        let err = fetcher.fetch("ftp://example.com/video", Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CruxError::Download(_)));
    }

    #[tokio::test]
    async fn test_missing_tool_reported() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher(dir.path(), "/nonexistent/yt-dlp");

        let err = fetcher
            .fetch("https://www.youtube.com/watch?v=dQw4w9WgXcQ", Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, CruxError::ToolNotFound(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_download_leaves_nothing_behind() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin_dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("audio");

        // Fake yt-dlp: writes a partial file next to the template, then fails
        let script = bin_dir.path().join("fake-yt-dlp");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             while [ \"$1\" != \"--output\" ]; do shift; done\n\
             out=$(echo \"$2\" | sed 's/%(ext)s/webm.part/')\n\
             echo partial > \"$out\"\n\
             echo 'ERROR: Sign in to confirm you are not a bot' >&2\n\
             exit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let fetcher = fetcher(&out_dir, script.to_str().unwrap());
        let err = fetcher
            .fetch("https://www.youtube.com/watch?v=dQw4w9WgXcQ", Uuid::new_v4())
            .await
            .unwrap_err();

        match err {
            CruxError::Download(msg) => assert!(msg.contains("not a bot")),
            other => panic!("expected download error, got {other:?}"),
        }
        assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_download_returns_guard() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin_dir = tempfile::tempdir().unwrap();

        let script = bin_dir.path().join("fake-yt-dlp");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             while [ \"$1\" != \"--output\" ]; do shift; done\n\
             out=$(echo \"$2\" | sed 's/%(ext)s/m4a/')\n\
             echo audio > \"$out\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let fetcher = fetcher(dir.path(), script.to_str().unwrap());
        let audio = fetcher
            .fetch("https://youtu.be/dQw4w9WgXcQ", Uuid::new_v4())
            .await
            .unwrap();

        let path = audio.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("m4a"));

        drop(audio);
        assert!(!path.exists());
    }
}
