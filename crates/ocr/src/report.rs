use serde::Serialize;
use visionai_core::{classify, ClassificationResult, CurrencyProfile};

use crate::types::ReadMode;

pub const NOT_FOUND_MESSAGE: &str =
    "Could not confidently detect currency. Please ensure the image is clear and well-lit.";

/// Shown and spoken in place of a report when a scan fails.
pub const SCAN_FAILED_MESSAGE: &str = "Error processing image. Please try again.";

/// What the reader shows and announces for one piece of recognized text.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScanReport {
    pub mode: ReadMode,
    /// Set only in currency mode when a profile qualified.
    pub detection: Option<ClassificationResult>,
    /// Display text: the verdict (currency mode) followed by the raw OCR text.
    pub text: String,
}

impl ScanReport {
    pub fn compose(mode: ReadMode, ocr_text: &str, profiles: &[CurrencyProfile]) -> Self {
        match mode {
            ReadMode::Document | ReadMode::Braille => {
                Self { mode, detection: None, text: ocr_text.to_string() }
            }
            ReadMode::Currency => {
                let detection = classify(ocr_text, profiles);
                let text = match &detection {
                    Some(r) => format!(
                        "Detected {} note\nDenomination: {}\nConfidence: {:.1}%\n\nRaw text:\n{ocr_text}",
                        r.currency, r.denomination, r.confidence
                    ),
                    None => format!("{NOT_FOUND_MESSAGE}\n\nRaw text:\n{ocr_text}"),
                };
                Self { mode, detection, text }
            }
        }
    }

    /// The first line: what is announced by default.
    pub fn speech_line(&self) -> &str {
        self.text.split('\n').next().unwrap_or("")
    }

    /// What to hand to speech output. Braille scans and explicit read-aloud
    /// requests get the whole report.
    pub fn speech_text(&self, read_all: bool) -> &str {
        if read_all || self.mode.reads_all() {
            &self.text
        } else {
            self.speech_line()
        }
    }
}
