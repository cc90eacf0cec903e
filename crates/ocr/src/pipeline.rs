use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::EventKind;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use visionai_core::ProfileSet;

use crate::hash;
use crate::preprocess;
use crate::recognizer::{OcrBackend, OcrError};
use crate::report::ScanReport;
use crate::types::ReadMode;

/// File extensions the intake watcher treats as captures.
pub const CAPTURE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tif", "tiff"];

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] crate::preprocess::PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("A scan is already in progress")]
    Busy,
}

/// The result of a single scan.
#[derive(Debug)]
pub struct ScanOutcome {
    /// SHA-256 hex digest of the capture bytes.
    pub scan_id: String,
    /// Where the capture was archived, when an archive is configured.
    pub archived_at: Option<PathBuf>,
    pub ocr_text: String,
    pub report: ScanReport,
}

/// Orchestrates: hash → archive → preprocess → OCR → classify → report.
///
/// At most one scan runs at a time per pipeline; a scan started while
/// another is in flight fails with [`PipelineError::Busy`] instead of queueing.
pub struct ReaderPipeline<R: OcrBackend> {
    recognizer: R,
    profiles: ProfileSet,
    archive_dir: Option<PathBuf>,
    in_flight: Mutex<()>,
}

impl<R: OcrBackend> ReaderPipeline<R> {
    pub fn new(recognizer: R, profiles: ProfileSet) -> Self {
        Self { recognizer, profiles, archive_dir: None, in_flight: Mutex::new(()) }
    }

    /// Keep a content-addressed copy of every capture under `dir`.
    pub fn with_archive(mut self, dir: PathBuf) -> Self {
        self.archive_dir = Some(dir);
        self
    }

    pub async fn process_file(
        &self,
        path: &Path,
        mode: ReadMode,
    ) -> Result<ScanOutcome, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin")
            .to_lowercase();
        self.process_bytes(&bytes, &ext, mode).await
    }

    /// Process raw bytes (from camera capture or file read).
    pub async fn process_bytes(
        &self,
        data: &[u8],
        ext: &str,
        mode: ReadMode,
    ) -> Result<ScanOutcome, PipelineError> {
        let _guard = self.in_flight.try_lock().map_err(|_| PipelineError::Busy)?;

        let scan_id = hash::scan_id(data);

        let archived_at = match &self.archive_dir {
            Some(dir) => {
                let dest = hash::archive_path(dir, &scan_id, ext);
                if let Some(parent) = dest.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&dest, data).await?;
                Some(dest)
            }
            None => None,
        };

        let image_bytes = preprocess::prepare_capture(data)?;
        let ocr_text = self.recognizer.recognize(&image_bytes)?;
        let report = ScanReport::compose(mode, &ocr_text, self.profiles.as_slice());

        match &report.detection {
            Some(d) => tracing::info!(
                scan_id = %scan_id,
                currency = %d.currency,
                denomination = %d.denomination,
                confidence = d.confidence,
                "currency detected"
            ),
            None => tracing::info!(scan_id = %scan_id, mode = %mode, chars = ocr_text.len(), "scan complete"),
        }

        Ok(ScanOutcome { scan_id, archived_at, ocr_text, report })
    }
}

pub fn is_capture(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| CAPTURE_EXTENSIONS.iter().any(|c| c.eq_ignore_ascii_case(e)))
}

// ── Watch-folder intake ───────────────────────────────────────────────────────

/// Whether a watcher event means a capture is ready to read.
///
/// inotify reports when the writer closes the file, so a half-copied capture
/// is never queued. Other backends only report creation; those captures go
/// through [`wait_until_settled`] before being read.
pub fn is_intake_event(kind: &EventKind) -> bool {
    #[cfg(target_os = "linux")]
    use notify::event::{AccessKind, AccessMode};

    match kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => true,
        #[cfg(target_os = "linux")]
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => true,
        #[cfg(not(target_os = "linux"))]
        EventKind::Create(_) => true,
        _ => false,
    }
}

/// Spawn a notify watcher on `watch_dir` that sends finished captures to
/// `tx`. The returned watcher must be kept alive.
pub fn spawn_intake_watcher(
    watch_dir: &Path,
    tx: mpsc::Sender<PathBuf>,
) -> notify::Result<impl notify::Watcher> {
    use notify::{RecursiveMode, Watcher};

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        match event {
            Ok(ev) if is_intake_event(&ev.kind) => {
                for path in ev.paths.into_iter().filter(|p| is_capture(p)) {
                    if tx.try_send(path).is_err() {
                        tracing::warn!("intake queue full, dropping capture");
                    }
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("intake watcher error: {e}"),
        }
    })?;

    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

/// Poll `path` until its size is non-zero and unchanged between two polls.
/// Returns the settled size, or `TimedOut` after `max_polls`.
pub async fn wait_until_settled(
    path: &Path,
    poll: Duration,
    max_polls: u32,
) -> std::io::Result<u64> {
    let mut last = tokio::fs::metadata(path).await?.len();
    for _ in 0..max_polls {
        tokio::time::sleep(poll).await;
        let len = tokio::fs::metadata(path).await?.len();
        if len > 0 && len == last {
            return Ok(len);
        }
        last = len;
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        format!("{} is still being written", path.display()),
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
