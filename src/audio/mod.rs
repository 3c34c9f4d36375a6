//! Audio fetching for CruX.
//!
//! Downloads the audio track of a video URL into a temporary file. The file is
//! owned by an [`AudioFile`] guard that deletes it when the job is done with it.

mod downloader;
mod source;

pub use downloader::YtDlpFetcher;
pub use source::{validate_url, youtube_video_id};

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Trait for audio fetchers.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    /// Download the audio of `url` into a file named after `job_id`.
    ///
    /// On error, nothing belonging to the job is left on disk.
    async fn fetch(&self, url: &str, job_id: Uuid) -> Result<AudioFile>;
}

/// A temporary audio file that is deleted exactly once.
///
/// Call [`AudioFile::remove`] to delete it eagerly and observe IO errors;
/// otherwise it is deleted when the guard is dropped. Leftovers sharing the
/// file stem (partial downloads, intermediate containers) go with it.
#[derive(Debug)]
pub struct AudioFile {
    path: PathBuf,
    removed: bool,
}

impl AudioFile {
    /// Take ownership of `path`. The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now.
    pub fn remove(mut self) -> std::io::Result<()> {
        self.removed = true;
        remove_with_leftovers(&self.path)
    }
}

impl Drop for AudioFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        if let Err(e) = remove_with_leftovers(&self.path) {
            warn!("Failed to cleanup audio file {}: {}", self.path.display(), e);
        }
    }
}

/// Removes `path` and any sibling file named `<stem>.*`.
fn remove_with_leftovers(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let (Some(dir), Some(stem)) = (path.parent(), path.file_stem().and_then(|s| s.to_str())) else {
        return Ok(());
    };
    let prefix = format!("{}.", stem);

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    for entry in entries.flatten() {
        if entry.file_name().to_string_lossy().starts_with(&prefix) {
            match std::fs::remove_file(entry.path()) {
                Ok(()) => debug!("Removed leftover {}", entry.path().display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crux-job.m4a");
        std::fs::write(&path, b"audio").unwrap();

        {
            let _guard = AudioFile::new(&path);
        }

        assert!(!path.exists());
    }

    #[test]
    fn test_remove_is_explicit_and_final() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crux-job.m4a");
        std::fs::write(&path, b"audio").unwrap();

        let guard = AudioFile::new(&path);
        guard.remove().unwrap();
        assert!(!path.exists());

        // A new file at the same path is not touched by the consumed guard
        std::fs::write(&path, b"other job").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_leftovers_removed_but_other_jobs_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crux-a.m4a");
        std::fs::write(dir.path().join("crux-a.webm.part"), b"partial").unwrap();
        std::fs::write(dir.path().join("crux-a.temp.m4a"), b"partial").unwrap();
        std::fs::write(dir.path().join("crux-ab.m4a"), b"another job").unwrap();

        AudioFile::new(&path).remove().unwrap();

        let remaining: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(remaining, vec!["crux-ab.m4a".to_string()]);
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let guard = AudioFile::new(dir.path().join("never-created.m4a"));
        assert!(guard.remove().is_ok());
    }
}
