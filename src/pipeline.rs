//! Pipeline orchestrator for CruX.
//!
//! Runs one job through fetch, transcribe, summarize and render, strictly in
//! that order. The first failing stage ends the job; later stages never run.

use crate::audio::{AudioFetcher, YtDlpFetcher};
use crate::config::{Credentials, Prompts, Settings};
use crate::error::{CruxError, Result};
use crate::render::{DocumentRenderer, PdfRenderer, DOCUMENT_FILENAME, DOCUMENT_MIME_TYPE};
use crate::summary::{create_summarizer, Summarizer};
use crate::transcription::{Transcriber, WhisperTranscriber};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// One step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Transcribe,
    Summarize,
    Render,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Fetch, Stage::Transcribe, Stage::Summarize, Stage::Render];

    /// 1-based position in the pipeline.
    pub fn number(&self) -> usize {
        match self {
            Stage::Fetch => 1,
            Stage::Transcribe => 2,
            Stage::Summarize => 3,
            Stage::Render => 4,
        }
    }

    /// Name used in user-facing failure messages.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Fetch => "Audio download",
            Stage::Transcribe => "Transcription",
            Stage::Summarize => "Summarization",
            Stage::Render => "Document rendering",
        }
    }

    /// Progress line shown while the stage runs.
    pub fn activity(&self) -> &'static str {
        match self {
            Stage::Fetch => "Downloading audio...",
            Stage::Transcribe => "Transcribing lecture (OpenAI Whisper)...",
            Stage::Summarize => "AI analyzing lecture...",
            Stage::Render => "Building PDF...",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Fetch => write!(f, "fetch"),
            Stage::Transcribe => write!(f, "transcribe"),
            Stage::Summarize => write!(f, "summarize"),
            Stage::Render => write!(f, "render"),
        }
    }
}

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running(Stage),
    Succeeded,
    Failed(Stage),
}

/// One user request, from URL to cheat sheet or error.
#[derive(Debug)]
pub struct Job {
    pub id: Uuid,
    pub source_url: String,
    /// Temporary audio file. Deleted once transcription is done.
    pub audio_path: Option<PathBuf>,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    pub document: Option<Vec<u8>>,
    pub status: JobStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    fn new(source_url: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_url: source_url.to_string(),
            audio_path: None,
            transcript: None,
            summary: None,
            document: None,
            status: JobStatus::Pending,
            error: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, JobStatus::Succeeded | JobStatus::Failed(_))
    }

    /// The cheat sheet on success, or the failure on any other outcome.
    pub fn outcome(self) -> std::result::Result<CheatSheet, JobFailure> {
        match (self.status, self.summary, self.document) {
            (JobStatus::Succeeded, Some(summary), Some(document)) => {
                Ok(CheatSheet { summary, document })
            }
            (JobStatus::Failed(stage), _, _) => Err(JobFailure {
                stage,
                message: self.error.unwrap_or_else(|| format!("{} failed", stage.label())),
            }),
            (status, _, _) => Err(JobFailure {
                stage: Stage::Fetch,
                message: format!("Job did not finish (status: {:?})", status),
            }),
        }
    }
}

/// The artifact of a successful job.
#[derive(Debug, Clone)]
pub struct CheatSheet {
    /// Study notes as Markdown.
    pub summary: String,
    /// Rendered PDF.
    pub document: Vec<u8>,
}

impl CheatSheet {
    pub fn filename(&self) -> &'static str {
        DOCUMENT_FILENAME
    }

    pub fn mime_type(&self) -> &'static str {
        DOCUMENT_MIME_TYPE
    }
}

/// Why a job failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub stage: Stage,
    pub message: String,
}

impl std::fmt::Display for JobFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Receives stage transitions, e.g. to drive a spinner.
pub trait ProgressSink: Send + Sync {
    fn stage_started(&self, stage: Stage);

    fn stage_finished(&self, _stage: Stage, _elapsed: Duration) {}
}

/// A progress sink that ignores everything.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn stage_started(&self, _stage: Stage) {}
}

/// The four-stage cheat sheet pipeline.
pub struct Pipeline {
    fetcher: Arc<dyn AudioFetcher>,
    transcriber: Arc<dyn Transcriber>,
    summarizer: Arc<dyn Summarizer>,
    renderer: Arc<dyn DocumentRenderer>,
}

impl Pipeline {
    /// Build the pipeline with the real adapters.
    pub fn new(settings: &Settings, credentials: &Credentials, prompts: Prompts) -> Result<Self> {
        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        info!(
            "Pipeline: yt-dlp -> {} -> {} ({})",
            settings.transcription.model,
            settings.summarization.provider,
            settings.summarization.model()
        );

        Ok(Self::with_components(
            Arc::new(YtDlpFetcher::new(settings.download.clone(), temp_dir)),
            Arc::new(WhisperTranscriber::new(&settings.transcription, credentials)?),
            create_summarizer(&settings.summarization, credentials, prompts)?,
            Arc::new(PdfRenderer::new(&settings.render)),
        ))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        fetcher: Arc<dyn AudioFetcher>,
        transcriber: Arc<dyn Transcriber>,
        summarizer: Arc<dyn Summarizer>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            fetcher,
            transcriber,
            summarizer,
            renderer,
        }
    }

    /// Run a job for `url` to completion.
    ///
    /// An empty URL is rejected with [`CruxError::MissingUrl`] before any job
    /// is created. Stage failures do not return `Err`; they are recorded on
    /// the returned job.
    pub async fn submit(&self, url: &str) -> Result<Job> {
        self.submit_with_progress(url, &NoProgress).await
    }

    /// Like [`Pipeline::submit`], reporting stage transitions to `progress`.
    pub async fn submit_with_progress(&self, url: &str, progress: &dyn ProgressSink) -> Result<Job> {
        let url = url.trim();
        if url.is_empty() {
            return Err(CruxError::MissingUrl);
        }

        let mut job = Job::new(url);
        self.run(&mut job, progress).await;
        Ok(job)
    }

    #[instrument(skip_all, fields(job_id = %job.id, url = %job.source_url))]
    async fn run(&self, job: &mut Job, progress: &dyn ProgressSink) {
        let result = self.run_stages(job, progress).await;
        job.finished_at = Some(Utc::now());
        let elapsed = job.finished_at.unwrap_or(job.created_at) - job.created_at;

        match result {
            Ok(()) => {
                job.status = JobStatus::Succeeded;
                info!("Job finished in {:.1}s", elapsed.num_milliseconds() as f64 / 1000.0);
            }
            Err(e) => {
                let stage = match job.status {
                    JobStatus::Running(stage) => stage,
                    _ => e.stage().unwrap_or(Stage::Fetch),
                };
                let prefix = format!("{} failed", stage.label());
                let detail = e.to_string();
                let message = if detail.starts_with(&prefix) {
                    detail
                } else {
                    format!("{}: {}", prefix, detail)
                };
                warn!("Job failed at stage {}/4 ({}): {}", stage.number(), stage, message);
                job.status = JobStatus::Failed(stage);
                job.error = Some(message);
            }
        }
    }

    async fn run_stages(&self, job: &mut Job, progress: &dyn ProgressSink) -> Result<()> {
        // 1. Fetch
        let started = enter(job, Stage::Fetch, progress);
        let audio = self.fetcher.fetch(&job.source_url, job.id).await?;
        job.audio_path = Some(audio.path().to_path_buf());
        leave(Stage::Fetch, started, progress);

        // 2. Transcribe; the audio is dropped whatever the outcome
        let started = enter(job, Stage::Transcribe, progress);
        let transcript = self.transcriber.transcribe(audio.path()).await;
        if let Err(e) = audio.remove() {
            warn!("Failed to cleanup audio file: {}", e);
        }
        job.transcript = Some(transcript?);
        leave(Stage::Transcribe, started, progress);

        // 3. Summarize
        let started = enter(job, Stage::Summarize, progress);
        let transcript = job.transcript.as_deref().unwrap_or_default();
        job.summary = Some(self.summarizer.summarize(transcript).await?);
        leave(Stage::Summarize, started, progress);

        // 4. Render
        let started = enter(job, Stage::Render, progress);
        let renderer = Arc::clone(&self.renderer);
        let summary = job.summary.clone().unwrap_or_default();
        let document = tokio::task::spawn_blocking(move || renderer.render(&summary))
            .await
            .map_err(|e| CruxError::Render(format!("render task failed: {e}")))??;
        job.document = Some(document);
        leave(Stage::Render, started, progress);

        Ok(())
    }
}

fn enter(job: &mut Job, stage: Stage, progress: &dyn ProgressSink) -> Instant {
    info!("Stage {}/4: {}", stage.number(), stage.activity());
    job.status = JobStatus::Running(stage);
    progress.stage_started(stage);
    Instant::now()
}

fn leave(stage: Stage, started: Instant, progress: &dyn ProgressSink) {
    let elapsed = started.elapsed();
    info!("Stage {} done in {:.1}s", stage, elapsed.as_secs_f64());
    progress.stage_finished(stage, elapsed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioFile;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    struct FakeFetcher {
        dir: PathBuf,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AudioFetcher for FakeFetcher {
        async fn fetch(&self, _url: &str, job_id: Uuid) -> Result<AudioFile> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let audio = AudioFile::new(self.dir.join(format!("crux-{}.m4a", job_id)));
            // Partial file written before the failure
            std::fs::write(audio.path(), b"partial audio")?;
            if self.fail {
                return Err(CruxError::Download("HTTP Error 403: Forbidden".to_string()));
            }
            Ok(audio)
        }
    }

    struct FakeTranscriber {
        fail: bool,
        calls: AtomicUsize,
        file_existed: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(&self, audio_path: &Path) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.file_existed.lock().unwrap().push(audio_path.exists());
            if self.fail {
                return Err(CruxError::Transcription("connection reset by peer".to_string()));
            }
            Ok("Today we cover Newton's three laws of motion.".to_string())
        }
    }

    struct FakeSummarizer {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        async fn summarize(&self, transcript: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CruxError::Summarization("quota exceeded".to_string()));
            }
            Ok(format!("# Cheat Sheet\n\n## Summary\n{}\n", transcript))
        }
    }

    struct CountingRenderer {
        inner: PdfRenderer,
        calls: AtomicUsize,
    }

    impl DocumentRenderer for CountingRenderer {
        fn render(&self, markdown: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.render(markdown)
        }
    }

    struct Harness {
        _dir: tempfile::TempDir,
        dir: PathBuf,
        fetcher: Arc<FakeFetcher>,
        transcriber: Arc<FakeTranscriber>,
        summarizer: Arc<FakeSummarizer>,
        renderer: Arc<CountingRenderer>,
        pipeline: Pipeline,
    }

    fn harness(fail_fetch: bool, fail_transcribe: bool, fail_summarize: bool) -> Harness {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_path_buf();

        let fetcher = Arc::new(FakeFetcher {
            dir: dir.clone(),
            fail: fail_fetch,
            calls: AtomicUsize::new(0),
        });
        let transcriber = Arc::new(FakeTranscriber {
            fail: fail_transcribe,
            calls: AtomicUsize::new(0),
            file_existed: Mutex::new(Vec::new()),
        });
        let summarizer = Arc::new(FakeSummarizer {
            fail: fail_summarize,
            calls: AtomicUsize::new(0),
        });
        let renderer = Arc::new(CountingRenderer {
            inner: PdfRenderer::default(),
            calls: AtomicUsize::new(0),
        });

        let pipeline = Pipeline::with_components(
            fetcher.clone(),
            transcriber.clone(),
            summarizer.clone(),
            renderer.clone(),
        );

        Harness {
            _dir: tmp,
            dir,
            fetcher,
            transcriber,
            summarizer,
            renderer,
            pipeline,
        }
    }

    impl Harness {
        fn files_left(&self) -> usize {
            std::fs::read_dir(&self.dir).unwrap().count()
        }

        fn calls(&self) -> [usize; 4] {
            [
                self.fetcher.calls.load(Ordering::SeqCst),
                self.transcriber.calls.load(Ordering::SeqCst),
                self.summarizer.calls.load(Ordering::SeqCst),
                self.renderer.calls.load(Ordering::SeqCst),
            ]
        }
    }

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[tokio::test]
    async fn test_empty_url_never_starts() {
        let h = harness(false, false, false);

        assert!(matches!(h.pipeline.submit("").await, Err(CruxError::MissingUrl)));
        assert!(matches!(h.pipeline.submit("   ").await, Err(CruxError::MissingUrl)));
        assert_eq!(h.calls(), [0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn test_all_stages_succeed() {
        let h = harness(false, false, false);

        let job = h.pipeline.submit(URL).await.unwrap();
        assert_eq!(job.status, JobStatus::Succeeded);
        assert!(job.is_finished());
        assert!(job.error.is_none());
        assert!(job.transcript.as_deref().unwrap().contains("Newton"));
        assert_eq!(h.calls(), [1, 1, 1, 1]);
        assert_eq!(*h.transcriber.file_existed.lock().unwrap(), vec![true]);

        let audio_path = job.audio_path.clone().unwrap();
        assert!(!audio_path.exists());
        assert_eq!(h.files_left(), 0);

        let sheet = assert_ok!(job.outcome());
        assert!(sheet.summary.starts_with("# Cheat Sheet"));
        assert!(sheet.document.starts_with(b"%PDF"));
        assert_eq!(sheet.filename(), "CruX_CheatSheet.pdf");
        assert_eq!(sheet.mime_type(), "application/pdf");
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_no_audio() {
        let h = harness(true, false, false);

        let job = h.pipeline.submit(URL).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed(Stage::Fetch));
        assert!(job.error.as_deref().unwrap().starts_with("Audio download failed"));
        assert_eq!(h.calls(), [1, 0, 0, 0]);
        assert_eq!(h.files_left(), 0);
    }

    #[tokio::test]
    async fn test_transcription_failure_cleans_up_and_stops() {
        let h = harness(false, true, false);

        let job = h.pipeline.submit(URL).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed(Stage::Transcribe));
        assert_eq!(h.calls(), [1, 1, 0, 0]);
        assert!(job.transcript.is_none());
        assert!(job.summary.is_none());
        assert_eq!(h.files_left(), 0);

        let failure = assert_err!(job.outcome());
        assert_eq!(failure.stage, Stage::Transcribe);
        assert!(failure.message.contains("Transcription failed"));
        assert!(failure.message.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_summarization_failure_skips_render() {
        let h = harness(false, false, true);

        let job = h.pipeline.submit(URL).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed(Stage::Summarize));
        assert_eq!(h.calls(), [1, 1, 1, 0]);
        assert!(job.transcript.is_some());
        assert!(job.document.is_none());
        assert_eq!(h.files_left(), 0);
    }

    #[tokio::test]
    async fn test_render_failure_is_reported() {
        struct BlankSummarizer;

        #[async_trait]
        impl Summarizer for BlankSummarizer {
            async fn summarize(&self, _transcript: &str) -> Result<String> {
                Ok("\n\n".to_string())
            }
        }

        let h = harness(false, false, false);
        let pipeline = Pipeline::with_components(
            h.fetcher.clone(),
            h.transcriber.clone(),
            Arc::new(BlankSummarizer),
            h.renderer.clone(),
        );

        let job = pipeline.submit(URL).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed(Stage::Render));
        assert!(job.error.as_deref().unwrap().starts_with("Document rendering failed"));
    }

    #[tokio::test]
    async fn test_progress_reports_each_stage_once() {
        #[derive(Default)]
        struct Recorder(Mutex<Vec<Stage>>);

        impl ProgressSink for Recorder {
            fn stage_started(&self, stage: Stage) {
                self.0.lock().unwrap().push(stage);
            }
        }

        let h = harness(false, false, false);
        let recorder = Recorder::default();
        h.pipeline.submit_with_progress(URL, &recorder).await.unwrap();
        assert_eq!(*recorder.0.lock().unwrap(), Stage::ALL.to_vec());

        let h = harness(false, true, false);
        let recorder = Recorder::default();
        h.pipeline.submit_with_progress(URL, &recorder).await.unwrap();
        assert_eq!(*recorder.0.lock().unwrap(), vec![Stage::Fetch, Stage::Transcribe]);
    }

    #[tokio::test]
    async fn test_concurrent_jobs_use_separate_files() {
        let h = harness(false, false, false);

        let (a, b) = tokio::join!(h.pipeline.submit(URL), h.pipeline.submit(URL));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.id, b.id);
        assert_ne!(a.audio_path, b.audio_path);
        assert_eq!(a.status, JobStatus::Succeeded);
        assert_eq!(b.status, JobStatus::Succeeded);
        assert_eq!(h.files_left(), 0);
    }

    #[test]
    fn test_stage_numbers_follow_order() {
        let numbers: Vec<usize> = Stage::ALL.iter().map(Stage::number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }
}
