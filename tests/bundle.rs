//! End-to-end bundle ingestion, without external PDF tools.

use std::io::{Cursor, Write};

use docx_rs::{Docx, Paragraph, Run};
use zip::write::SimpleFileOptions;

use contpal::ocr::TextExtractor;
use contpal::repository::Repository;
use contpal::services::IngestService;

fn docx_bytes(lines: &[&str]) -> Vec<u8> {
    let mut docx = Docx::new();
    for line in lines {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)));
    }
    let mut buffer = Cursor::new(Vec::new());
    docx.build().pack(&mut buffer).unwrap();
    buffer.into_inner()
}

fn bundle(entries: &[(&str, &[u8])]) -> Cursor<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap()
}

#[test]
fn mixed_bundle_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::open(dir.path()).unwrap();
    repo.add_company("Plasticos Rival", "1790012345001").unwrap();

    let report_docx = docx_bytes(&[
        "PLASTICOS RIVAL CIA LTDA",
        "informe del año 2021",
        "el gato corre y el gato come",
    ]);
    let archive = bundle(&[
        ("reporte.docx", report_docx.as_slice()),
        ("notas.txt", b"informe 2020 sin entidad conocida, gato persistente".as_slice()),
        ("hoja.xlsx", b"not a supported format".as_slice()),
        ("corrupt.docx", b"definitely not a docx file".as_slice()),
    ]);

    let service = IngestService::new(&repo, TextExtractor::default(), 0.8);
    let report = service.ingest_bundle_reader(archive).unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.accumulation_failures, 0);

    // The corrupt entry left no document behind.
    assert_eq!(repo.document_count().unwrap(), 2);

    let conn = rusqlite::Connection::open(repo.database_path()).unwrap();
    let (year, company_id): (u32, Option<i64>) = conn
        .query_row(
            "SELECT year, company_id FROM documents WHERE filename = 'reporte.docx'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(year, 2021);
    assert!(company_id.is_some());

    let (year, company_id): (u32, Option<i64>) = conn
        .query_row(
            "SELECT year, company_id FROM documents WHERE filename = 'notas.txt'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(year, 2020);
    assert_eq!(company_id, None);

    // Stopwords filtered, counts year-scoped.
    assert_eq!(repo.word_total(2021, "gato").unwrap(), Some(2));
    assert_eq!(repo.word_total(2020, "gato").unwrap(), Some(1));
    assert_eq!(repo.word_total(2021, "el").unwrap(), None);
}

#[test]
fn corrupt_entry_does_not_abort_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::open(dir.path()).unwrap();

    // Stored entries keep the payload verbatim, so a flipped byte breaks the
    // CRC of one member without touching the central directory.
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file("danado.txt", options).unwrap();
    writer.write_all(b"contenido que se va a romper").unwrap();
    writer.start_file("bueno.txt", options).unwrap();
    writer.write_all(b"informe 2021 del gato").unwrap();
    let mut bytes = writer.finish().unwrap().into_inner();

    let needle = b"contenido que";
    let pos = bytes
        .windows(needle.len())
        .position(|w| w == needle)
        .unwrap();
    bytes[pos] ^= 0xFF;

    let service = IngestService::new(&repo, TextExtractor::default(), 0.8);
    let report = service.ingest_bundle_reader(Cursor::new(bytes)).unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 0);

    // The healthy sibling went through the full pipeline.
    assert_eq!(repo.document_count().unwrap(), 1);
    assert_eq!(repo.word_total(2021, "gato").unwrap(), Some(1));
}

#[test]
fn accumulation_failure_still_persists_document() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::open(dir.path()).unwrap();

    // Break only the counting stage; document persistence must not notice.
    let conn = rusqlite::Connection::open(repo.database_path()).unwrap();
    conn.execute_batch("DROP TABLE counts;").unwrap();

    let archive = bundle(&[("notas.txt", b"informe 2021 del gato".as_slice())]);
    let service = IngestService::new(&repo, TextExtractor::default(), 0.8);
    let report = service.ingest_bundle_reader(archive).unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.accumulation_failures, 1);

    assert_eq!(repo.document_count().unwrap(), 1);
    let year: u32 = conn
        .query_row(
            "SELECT year FROM documents WHERE filename = 'notas.txt'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(year, 2021);
}

#[test]
fn extension_match_is_case_sensitive() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::open(dir.path()).unwrap();

    let archive = bundle(&[("INFORME.TXT", b"contenido".as_slice())]);
    let service = IngestService::new(&repo, TextExtractor::default(), 0.8);
    let report = service.ingest_bundle_reader(archive).unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(repo.document_count().unwrap(), 0);
}

#[test]
fn directory_entries_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::open(dir.path()).unwrap();

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.add_directory("empresa/", SimpleFileOptions::default()).unwrap();
    writer
        .start_file("empresa/notas.txt", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"informe del gato").unwrap();
    let archive = writer.finish().unwrap();

    let service = IngestService::new(&repo, TextExtractor::default(), 0.8);
    let report = service.ingest_bundle_reader(archive).unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 0);

    // Stored under the base filename, not the archive path.
    let conn = rusqlite::Connection::open(repo.database_path()).unwrap();
    let filename: String = conn
        .query_row("SELECT filename FROM documents", [], |row| row.get(0))
        .unwrap();
    assert_eq!(filename, "notas.txt");
}

#[test]
fn empty_bundle_reports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::open(dir.path()).unwrap();

    let archive = bundle(&[]);
    let service = IngestService::new(&repo, TextExtractor::default(), 0.8);
    let report = service.ingest_bundle_reader(archive).unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.failed, 0);
}

#[test]
fn single_file_trigger_runs_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::open(dir.path()).unwrap();
    repo.add_company("Telconet", "0990054321001").unwrap();

    let file = dir.path().join("memoria.txt");
    std::fs::write(&file, "memoria anual de telconet, ejercicio 2022, gato").unwrap();

    let service = IngestService::new(&repo, TextExtractor::default(), 0.8);
    let processed = service.process_file(&file).unwrap();

    assert_eq!(processed.year, 2022);
    assert_eq!(processed.company.display_name(), "Telconet");
    assert!(processed.accumulated);
    assert_eq!(repo.word_total(2022, "gato").unwrap(), Some(1));

    let doc = repo.get_document(processed.document_id).unwrap().unwrap();
    assert_eq!(doc.filename, "memoria.txt");
}

#[test]
fn single_file_trigger_rejects_unsupported_format() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::open(dir.path()).unwrap();

    let file = dir.path().join("hoja.xlsx");
    std::fs::write(&file, b"spreadsheet").unwrap();

    let service = IngestService::new(&repo, TextExtractor::default(), 0.8);
    let err = service.process_file(&file).unwrap_err();
    assert!(matches!(
        err,
        contpal::services::IngestError::UnsupportedFormat(_)
    ));
    assert_eq!(repo.document_count().unwrap(), 0);
}
