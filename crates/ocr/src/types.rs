use serde::{Deserialize, Serialize};

/// Languages offered for recognition. Parsed from and displayed as the
/// Tesseract traineddata code.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Language {
    #[default]
    #[serde(rename = "eng")]
    English,
    #[serde(rename = "spa")]
    Spanish,
    #[serde(rename = "fra")]
    French,
    #[serde(rename = "deu")]
    German,
    #[serde(rename = "chi_sim")]
    ChineseSimplified,
    #[serde(rename = "jpn")]
    Japanese,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::ChineseSimplified,
        Language::Japanese,
    ];

    pub fn ocr_code(self) -> &'static str {
        match self {
            Language::English => "eng",
            Language::Spanish => "spa",
            Language::French => "fra",
            Language::German => "deu",
            Language::ChineseSimplified => "chi_sim",
            Language::Japanese => "jpn",
        }
    }

    /// BCP-47 tag handed to the speech collaborator.
    pub fn speech_tag(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::ChineseSimplified => "zh",
            Language::Japanese => "ja",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::ChineseSimplified => "Chinese (Simplified)",
            Language::Japanese => "Japanese",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ocr_code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|l| l.ocr_code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown language code: '{s}'"))
    }
}

/// What the reader should do with recognized text.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    /// Classify the text as a banknote.
    #[default]
    Currency,
    /// Read the text back as-is.
    Document,
    /// Embossed text, recognized in English and read out in full.
    Braille,
}

impl ReadMode {
    /// Braille is always recognized as English, whatever is configured.
    pub fn language(self, configured: Language) -> Language {
        match self {
            ReadMode::Braille => Language::English,
            _ => configured,
        }
    }

    /// Whether the whole report is announced rather than its first line.
    pub fn reads_all(self) -> bool {
        matches!(self, ReadMode::Braille)
    }
}

impl std::fmt::Display for ReadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadMode::Currency => write!(f, "currency"),
            ReadMode::Document => write!(f, "document"),
            ReadMode::Braille => write!(f, "braille"),
        }
    }
}

impl std::str::FromStr for ReadMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "currency" => Ok(ReadMode::Currency),
            "document" => Ok(ReadMode::Document),
            "braille" => Ok(ReadMode::Braille),
            other => Err(format!("Unknown read mode: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn language_roundtrip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_str(&lang.to_string()).unwrap(), lang);
        }
    }

    #[test]
    fn language_parse_is_case_insensitive() {
        assert_eq!(Language::from_str("CHI_SIM").unwrap(), Language::ChineseSimplified);
        assert!(Language::from_str("klingon").is_err());
    }

    #[test]
    fn speech_tags() {
        assert_eq!(Language::Spanish.speech_tag(), "es");
        assert_eq!(Language::Japanese.speech_tag(), "ja");
    }

    #[test]
    fn language_serde_uses_ocr_codes() {
        let json = serde_json::to_string(&Language::German).unwrap();
        assert_eq!(json, "\"deu\"");
    }

    #[test]
    fn read_mode_roundtrip() {
        assert_eq!(ReadMode::from_str(&ReadMode::Document.to_string()).unwrap(), ReadMode::Document);
        assert_eq!(ReadMode::from_str("Currency").unwrap(), ReadMode::Currency);
        assert_eq!(ReadMode::from_str("braille").unwrap(), ReadMode::Braille);
        assert!(ReadMode::from_str("navigation").is_err());
    }

    #[test]
    fn braille_forces_english() {
        assert_eq!(ReadMode::Braille.language(Language::German), Language::English);
        assert_eq!(ReadMode::Document.language(Language::German), Language::German);
        assert!(ReadMode::Braille.reads_all());
        assert!(!ReadMode::Currency.reads_all());
    }

    #[test]
    fn defaults() {
        assert_eq!(Language::default(), Language::English);
        assert_eq!(ReadMode::default(), ReadMode::Currency);
    }
}
