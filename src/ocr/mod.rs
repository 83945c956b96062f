//! Text extraction and OCR fallback.
//!
//! Extracts plain text from report files using:
//! - pdftotext (Poppler) for PDF pages with an embedded text layer
//! - Tesseract OCR for scanned PDF pages with no text layer
//! - docx-rs for Word documents
//! - lossy UTF-8 decoding for plain text files
//!
//! OCR is a best-effort fallback: a recognition failure degrades to an empty
//! page contribution and never aborts the enclosing document.

mod extractor;
mod tesseract;

pub use extractor::{ExtractionError, TextExtractor};
pub use tesseract::{OcrError, TesseractOcr};

use std::process::Command;

/// Check if a binary is available in PATH.
pub(crate) fn check_binary(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Report availability of the external tools the extractor shells out to.
pub fn check_tools() -> Vec<(String, bool)> {
    ["pdftotext", "pdftoppm", "pdfinfo", "tesseract"]
        .iter()
        .map(|tool| (tool.to_string(), check_binary(tool)))
        .collect()
}
