//! Document model and format dispatch.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported document formats, selected by filename extension.
///
/// Matching is case-sensitive: a `.PDF` entry is not accepted. Every format
/// extracts to a uniform plain-text result so downstream stages stay
/// format-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Detect the format from a filename, or `None` for unsupported entries.
    pub fn from_filename(filename: &str) -> Option<Self> {
        if filename.ends_with(".pdf") {
            Some(Self::Pdf)
        } else if filename.ends_with(".docx") {
            Some(Self::Docx)
        } else if filename.ends_with(".txt") {
            Some(Self::Txt)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }
}

/// One accepted, persisted report from a bundle.
///
/// A year of 0 means "undetected"; a missing company reference means no
/// catalog entry cleared the similarity threshold. The original uploaded
/// bytes are retained verbatim at `file_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Database row ID.
    pub id: i64,
    /// Base filename of the bundle entry this document came from.
    pub filename: String,
    /// Path to the stored raw bytes.
    pub file_path: PathBuf,
    /// Resolved company, when a catalog entry matched.
    pub company_id: Option<i64>,
    /// Detected fiscal year; 0 when no year token was found.
    pub year: u32,
    /// When this document was ingested.
    pub created_at: DateTime<Utc>,
}
