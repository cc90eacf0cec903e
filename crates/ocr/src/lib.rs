pub mod hash;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod report;
pub mod types;

pub use hash::{scan_id, sha256_bytes, to_hex};
pub use pipeline::{spawn_intake_watcher, PipelineError, ReaderPipeline, ScanOutcome};
pub use preprocess::{prepare_capture, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, UnavailableRecognizer};
pub use report::{ScanReport, NOT_FOUND_MESSAGE, SCAN_FAILED_MESSAGE};
pub use types::{Language, ReadMode};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
