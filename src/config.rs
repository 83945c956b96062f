//! Configuration management for contpal.
//!
//! Settings are loaded from a TOML file (`contpal.toml` in the working
//! directory, or a path given with `--config`) with serde defaults for every
//! field, so an empty or missing file yields a working configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding the database and stored document files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub ocr: OcrSettings,

    #[serde(default)]
    pub resolver: ResolverSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            ocr: OcrSettings::default(),
            resolver: ResolverSettings::default(),
        }
    }
}

/// OCR fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrSettings {
    /// Tesseract language pack. Reports are Spanish-language filings.
    #[serde(default = "default_language")]
    pub language: String,
    /// Rasterization resolution for scanned pages.
    #[serde(default = "default_dpi")]
    pub dpi: u32,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: default_language(),
            dpi: default_dpi(),
        }
    }
}

/// Company resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Minimum similarity ratio for a fuzzy company match.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("contpal")
}

fn default_language() -> String {
    "spa".to_string()
}

fn default_dpi() -> u32 {
    300
}

fn default_similarity_threshold() -> f64 {
    0.8
}

impl Settings {
    /// Load settings, applying CLI overrides.
    ///
    /// `config` names an explicit config file; otherwise `contpal.toml` in
    /// the working directory is used when present. `target` overrides the
    /// data directory regardless of what the config file says.
    pub fn load(config: Option<&Path>, target: Option<&Path>) -> anyhow::Result<Self> {
        let path = match config {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = PathBuf::from("contpal.toml");
                default.exists().then_some(default)
            }
        };

        let mut settings = match path {
            Some(p) => {
                let raw = fs::read_to_string(&p)?;
                toml::from_str(&raw)?
            }
            None => Settings::default(),
        };

        if let Some(t) = target {
            settings.data_dir = t.to_path_buf();
        }

        Ok(settings)
    }
}
