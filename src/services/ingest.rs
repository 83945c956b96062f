//! Bundle ingestion orchestrator.
//!
//! Unpacks a ZIP bundle and drives the pipeline per entry: extraction (with
//! OCR fallback) → company/year resolution → document persistence → word
//! frequency analysis → count accumulation. Failures are isolated per entry
//! so one bad file never aborts the bundle.

use std::io::{Read, Seek};
use std::path::Path;

use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::word_frequencies;
use crate::models::{Company, DocumentFormat, ResolvedCompany};
use crate::ocr::{ExtractionError, TextExtractor};
use crate::repository::{Repository, RepositoryError};

use super::resolve::{detect_year, resolve_company};

/// Errors from the ingestion pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid bundle: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    #[error("Storage error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-bundle outcome counts, for caller visibility.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Entries that produced a persisted document.
    pub processed: usize,
    /// Entries silently skipped for an unrecognized extension.
    pub skipped: usize,
    /// Entries that failed extraction or persistence; no document row exists
    /// for these.
    pub failed: usize,
    /// Processed documents whose count merge rolled back. The document
    /// itself remains persisted.
    pub accumulation_failures: usize,
}

/// Result of running the pipeline for one accepted entry.
#[derive(Debug)]
pub struct ProcessedDocument {
    pub document_id: i64,
    pub year: u32,
    pub company: ResolvedCompany,
    /// False when the count merge failed and was rolled back.
    pub accumulated: bool,
}

/// Drives the per-entry pipeline against a repository.
pub struct IngestService<'a> {
    repo: &'a Repository,
    extractor: TextExtractor,
    similarity_threshold: f64,
}

impl<'a> IngestService<'a> {
    pub fn new(repo: &'a Repository, extractor: TextExtractor, similarity_threshold: f64) -> Self {
        Self {
            repo,
            extractor,
            similarity_threshold,
        }
    }

    /// Ingest a ZIP bundle from disk.
    pub fn ingest_bundle(&self, bundle_path: &Path) -> Result<IngestReport, IngestError> {
        let file = std::fs::File::open(bundle_path)?;
        self.ingest_bundle_reader(file)
    }

    /// Ingest a ZIP bundle from any seekable byte stream.
    ///
    /// Entries are processed strictly sequentially, in archive order.
    pub fn ingest_bundle_reader<R: Read + Seek>(
        &self,
        reader: R,
    ) -> Result<IngestReport, IngestError> {
        let mut archive = zip::ZipArchive::new(reader)?;
        // One catalog snapshot per bundle, so every entry resolves against
        // the same company list.
        let companies = self.repo.list_companies()?;
        let mut report = IngestReport::default();

        for index in 0..archive.len() {
            // A single unreadable entry must not abort its siblings; only
            // the central-directory parse above is fatal to the run.
            let mut entry = match archive.by_index(index) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("entry {} unreadable: {}", index, e);
                    report.failed += 1;
                    continue;
                }
            };
            if entry.is_dir() {
                continue;
            }
            let entry_name = entry.name().to_string();

            let Some(format) = DocumentFormat::from_filename(&entry_name) else {
                debug!("skipping unsupported entry: {}", entry_name);
                report.skipped += 1;
                continue;
            };

            let mut bytes = Vec::new();
            if let Err(e) = entry.read_to_end(&mut bytes) {
                warn!("entry {} failed to decompress: {}", entry_name, e);
                report.failed += 1;
                continue;
            }

            let filename = base_filename(&entry_name);
            match self.process_bytes(filename, &bytes, format, &companies) {
                Ok(processed) => {
                    report.processed += 1;
                    if !processed.accumulated {
                        report.accumulation_failures += 1;
                    }
                }
                Err(e) => {
                    warn!("entry {} failed: {}", entry_name, e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Run the pipeline for a single on-disk file, outside any bundle.
    ///
    /// This is the non-bundle ingestion path: a freshly uploaded document
    /// goes through the same extraction, resolution and accumulation steps.
    pub fn process_file(&self, path: &Path) -> Result<ProcessedDocument, IngestError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let format = DocumentFormat::from_filename(&filename)
            .ok_or_else(|| IngestError::UnsupportedFormat(filename.clone()))?;

        let bytes = std::fs::read(path)?;
        let companies = self.repo.list_companies()?;
        self.run_pipeline(&filename, path, &bytes, format, &companies)
    }

    /// Pipeline entry point for in-memory bundle entries.
    ///
    /// The raw bytes are staged in a scoped temp directory for the
    /// path-based extractor, released when the entry completes.
    fn process_bytes(
        &self,
        filename: &str,
        bytes: &[u8],
        format: DocumentFormat,
        companies: &[Company],
    ) -> Result<ProcessedDocument, IngestError> {
        let temp_dir = TempDir::new()?;
        let staged = temp_dir.path().join(filename);
        std::fs::write(&staged, bytes)?;
        self.run_pipeline(filename, &staged, bytes, format, companies)
    }

    /// Extraction → resolution → persistence → analysis → accumulation.
    ///
    /// Persistence and accumulation are independent commit points: an
    /// accumulation failure leaves the document row and raw bytes in place.
    fn run_pipeline(
        &self,
        filename: &str,
        file_path: &Path,
        bytes: &[u8],
        format: DocumentFormat,
        companies: &[Company],
    ) -> Result<ProcessedDocument, IngestError> {
        let text = self.extractor.extract(file_path, format)?;

        let year = detect_year(&text);
        let company = resolve_company(&text, companies, self.similarity_threshold);

        let document_id =
            self.repo
                .create_document(filename, bytes, company.company_id(), year)?;
        info!(
            "persisted {} ({}): year {}, company {}",
            filename,
            format.as_str(),
            year,
            company.display_name()
        );

        let frequencies = word_frequencies(&text);
        let accumulated = match self.repo.accumulate(document_id, year, &frequencies) {
            Ok(()) => true,
            Err(e) => {
                warn!("accumulation failed for document {}: {}", document_id, e);
                false
            }
        };

        Ok(ProcessedDocument {
            document_id,
            year,
            company,
            accumulated,
        })
    }
}

/// Strip archive path components from an entry name.
fn base_filename(entry_name: &str) -> &str {
    entry_name.rsplit('/').next().unwrap_or(entry_name)
}
