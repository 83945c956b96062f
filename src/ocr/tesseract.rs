//! Tesseract OCR fallback for scanned PDF pages.
//!
//! Rasterizes a single page with pdftoppm and recognizes it with the
//! Tesseract command-line tool. Rasterized images live in a per-page
//! `TempDir` that is released on every exit path.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use thiserror::Error;

/// Errors from the OCR fallback path.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tesseract-based OCR for one PDF page at a time.
pub struct TesseractOcr {
    /// Tesseract language pack, e.g. "spa".
    language: String,
    /// Rasterization resolution.
    dpi: u32,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self {
            language: "spa".to_string(),
            dpi: 300,
        }
    }
}

impl TesseractOcr {
    pub fn new(language: &str, dpi: u32) -> Self {
        Self {
            language: language.to_string(),
            dpi,
        }
    }

    /// OCR a single page of a PDF file.
    ///
    /// Converts the page to an image in a scoped temp directory and runs
    /// Tesseract on it.
    pub fn ocr_pdf_page(&self, pdf_path: &Path, page: u32) -> Result<String, OcrError> {
        let temp_dir = TempDir::new()?;
        let image_path = self.pdf_page_to_image(pdf_path, page, temp_dir.path())?;
        self.run_tesseract(&image_path)
    }

    /// Convert one PDF page to a PNG image.
    fn pdf_page_to_image(
        &self,
        pdf_path: &Path,
        page: u32,
        output_dir: &Path,
    ) -> Result<PathBuf, OcrError> {
        let page_str = page.to_string();
        let dpi_str = self.dpi.to_string();
        let output_prefix = output_dir.join("page");

        let status = Command::new("pdftoppm")
            .args(["-png", "-r", &dpi_str, "-f", &page_str, "-l", &page_str])
            .arg(pdf_path)
            .arg(&output_prefix)
            .status();

        match status {
            Ok(s) if s.success() => find_page_image(output_dir, page).ok_or_else(|| {
                OcrError::OcrFailed(format!("No image generated for page {}", page))
            }),
            Ok(_) => Err(OcrError::OcrFailed(
                "pdftoppm failed to convert PDF page".to_string(),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(OcrError::ToolNotFound(
                "pdftoppm (install poppler-utils)".to_string(),
            )),
            Err(e) => Err(OcrError::Io(e)),
        }
    }

    /// Run Tesseract on an image file.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!("tesseract failed: {}", stderr)))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(OcrError::ToolNotFound(
                "tesseract (install tesseract-ocr)".to_string(),
            )),
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

/// Find the image file pdftoppm generated for a page number.
fn find_page_image(temp_path: &Path, page_num: u32) -> Option<PathBuf> {
    // pdftoppm names files like page-01.png, page-02.png; documents with
    // many pages get more digits: page-001.png
    for digits in [1, 2, 3, 4] {
        let filename = format!("page-{:0width$}.png", page_num, width = digits);
        let path = temp_path.join(&filename);
        if path.exists() {
            return Some(path);
        }
    }
    None
}
