//! Plain-text extraction from report files.

use std::path::Path;
use std::process::Command;

use thiserror::Error;

use crate::models::DocumentFormat;

use super::tesseract::{OcrError, TesseractOcr};

/// Errors that can occur during text extraction.
///
/// These are recoverable at the bundle level: the orchestrator skips the
/// affected entry and continues.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text extractor dispatching on document format.
///
/// PDF input is processed page by page: pages with an embedded text layer
/// use pdftotext, pages without one fall back to Tesseract OCR. DOCX and TXT
/// never touch external tools.
pub struct TextExtractor {
    ocr: TesseractOcr,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self {
            ocr: TesseractOcr::default(),
        }
    }
}

impl TextExtractor {
    pub fn new(ocr: TesseractOcr) -> Self {
        Self { ocr }
    }

    /// Extract plain text from a file of a known format.
    pub fn extract(
        &self,
        file_path: &Path,
        format: DocumentFormat,
    ) -> Result<String, ExtractionError> {
        match format {
            DocumentFormat::Txt => extract_txt(file_path),
            DocumentFormat::Docx => extract_docx(file_path),
            DocumentFormat::Pdf => self.extract_pdf(file_path),
        }
    }

    /// Extract a PDF page by page, falling back to OCR for pages with no
    /// text layer.
    fn extract_pdf(&self, file_path: &Path) -> Result<String, ExtractionError> {
        let page_count = pdf_page_count(file_path)?.ok_or_else(|| {
            ExtractionError::ExtractionFailed(format!("unreadable PDF: {}", file_path.display()))
        })?;

        let mut blocks: Vec<String> = Vec::with_capacity(page_count as usize);

        for page in 1..=page_count {
            let direct = match pdf_page_text(file_path, page) {
                Ok(text) => text,
                Err(e @ ExtractionError::ToolNotFound(_)) => return Err(e),
                Err(e) => {
                    tracing::debug!("pdftotext failed on page {}: {}", page, e);
                    String::new()
                }
            };

            if needs_ocr(&direct) {
                // No text layer on this page. OCR is best-effort: a failure
                // degrades to an empty contribution for the page.
                let recognized = match self.ocr.ocr_pdf_page(file_path, page) {
                    Ok(text) => text,
                    Err(OcrError::ToolNotFound(tool)) => {
                        return Err(ExtractionError::ToolNotFound(tool))
                    }
                    Err(e) => {
                        tracing::warn!("OCR failed on page {}: {}", page, e);
                        String::new()
                    }
                };
                blocks.push(page_block(page, &recognized, true));
            } else {
                blocks.push(page_block(page, &direct, false));
            }
        }

        Ok(blocks.join("\n"))
    }
}

/// Whether a page has no usable text layer and needs the OCR fallback.
fn needs_ocr(direct_text: &str) -> bool {
    direct_text.trim().is_empty()
}

/// Assemble one page's contribution with its header marker.
fn page_block(page: u32, text: &str, from_ocr: bool) -> String {
    if from_ocr {
        format!("[Página {} - OCR]\n{}", page, text.trim())
    } else {
        format!("[Página {}]\n{}", page, text.trim())
    }
}

/// Read a plain text file, dropping invalid UTF-8 sequences.
fn extract_txt(file_path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(file_path)?;
    // Lossy decoding inserts U+FFFD for invalid sequences; drop those so bad
    // bytes vanish instead of becoming tokens.
    let text: String = String::from_utf8_lossy(&bytes)
        .chars()
        .filter(|c| *c != '\u{FFFD}')
        .collect();
    Ok(text)
}

/// Parse a DOCX file and concatenate its paragraphs, one per line.
fn extract_docx(file_path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(file_path)?;
    let doc = docx_rs::read_docx(&bytes)
        .map_err(|e| ExtractionError::ExtractionFailed(format!("corrupt DOCX: {}", e)))?;

    let mut paragraphs: Vec<String> = Vec::new();
    for child in doc.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            let mut line = String::new();
            for child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let docx_rs::RunChild::Text(text) = child {
                            line.push_str(&text.text);
                        }
                    }
                }
            }
            paragraphs.push(line);
        }
    }

    Ok(paragraphs.join("\n"))
}

/// Get the page count of a PDF via pdfinfo.
fn pdf_page_count(file_path: &Path) -> Result<Option<u32>, ExtractionError> {
    let output = Command::new("pdfinfo").arg(file_path).output();

    let output = match output {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExtractionError::ToolNotFound(
                "pdfinfo (install poppler-utils)".to_string(),
            ))
        }
        Err(e) => return Err(ExtractionError::Io(e)),
    };

    if !output.status.success() {
        return Ok(None);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        if line.starts_with("Pages:") {
            return Ok(line.split_whitespace().nth(1).and_then(|s| s.parse().ok()));
        }
    }
    Ok(None)
}

/// Run pdftotext on a single page of a PDF file.
fn pdf_page_text(file_path: &Path, page: u32) -> Result<String, ExtractionError> {
    let page_str = page.to_string();
    let output = Command::new("pdftotext")
        .args(["-layout", "-enc", "UTF-8", "-f", &page_str, "-l", &page_str])
        .arg(file_path)
        .arg("-") // Output to stdout
        .output();

    match output {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractionError::ExtractionFailed(format!(
                    "pdftotext failed on page {}: {}",
                    page, stderr
                )))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ExtractionError::ToolNotFound(
            "pdftotext (install poppler-utils)".to_string(),
        )),
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use docx_rs::{Docx, Paragraph, Run};

    #[test]
    fn test_ocr_only_when_text_layer_is_empty() {
        // A page with any extractable text never invokes OCR; a page whose
        // direct extraction is blank always does.
        assert!(!needs_ocr("Informe anual 2021"));
        assert!(needs_ocr(""));
        assert!(needs_ocr(" \n\t "));
    }

    #[test]
    fn test_page_block_markers() {
        assert_eq!(page_block(1, "hola\n", false), "[Página 1]\nhola");
        assert_eq!(page_block(4, " escaneado ", true), "[Página 4 - OCR]\nescaneado");
    }

    #[test]
    fn test_page_block_empty_ocr_result() {
        // A failed recognition still contributes its marker.
        assert_eq!(page_block(2, "", true), "[Página 2 - OCR]\n");
    }

    #[test]
    fn test_extract_txt_drops_invalid_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notas.txt");
        std::fs::write(&path, b"informe \xff\xfe anual").unwrap();

        let text = extract_txt(&path).unwrap();
        assert_eq!(text, "informe  anual");
    }

    #[test]
    fn test_extract_docx_concatenates_paragraphs() {
        let mut buffer = Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("informe anual")))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("ejercicio 2021")))
            .build()
            .pack(&mut buffer)
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reporte.docx");
        std::fs::write(&path, buffer.into_inner()).unwrap();

        let text = extract_docx(&path).unwrap();
        assert_eq!(text, "informe anual\nejercicio 2021");
    }

    #[test]
    fn test_extract_docx_corrupt_is_recoverable_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.docx");
        std::fs::write(&path, b"this is not a docx").unwrap();

        let err = extract_docx(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::ExtractionFailed(_)));
    }
}
