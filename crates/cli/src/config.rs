use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use visionai_core::{ProfileError, ProfileSet};
use visionai_ocr::{Language, ReadMode};

pub const CONFIG_FILE: &str = "visionai.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid profile table: {0}")]
    Profiles(#[from] ProfileError),
}

/// Settings from `visionai.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub language: Language,
    pub mode: ReadMode,
    /// TOML file with a `[[profile]]` table replacing the built-in one.
    pub profiles: Option<PathBuf>,
    /// Tesseract traineddata directory.
    pub tessdata: Option<PathBuf>,
    /// Where captures are archived by content hash.
    pub archive_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_content)?)
    }

    /// An explicit path must exist; the default location may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };
        tracing::debug!(path = %path.display(), "loading config");
        Self::from_toml(&read(&path)?)
    }

    pub fn load_profiles(&self) -> Result<ProfileSet, ConfigError> {
        match &self.profiles {
            Some(path) => Ok(ProfileSet::from_toml(&read(path)?)?),
            None => Ok(ProfileSet::builtin()),
        }
    }
}

pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "visionai", "VisionAI")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
