//! Command implementations.

use std::path::Path;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use crate::ocr::{self, TesseractOcr, TextExtractor};
use crate::repository::Repository;
use crate::services::IngestService;

fn open_repository(settings: &Settings) -> anyhow::Result<Repository> {
    Ok(Repository::open(&settings.data_dir)?)
}

fn ingest_service<'a>(settings: &Settings, repo: &'a Repository) -> IngestService<'a> {
    let ocr = TesseractOcr::new(&settings.ocr.language, settings.ocr.dpi);
    IngestService::new(
        repo,
        TextExtractor::new(ocr),
        settings.resolver.similarity_threshold,
    )
}

/// Ingest a ZIP bundle of reports.
pub fn cmd_ingest(settings: &Settings, bundle: &Path) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let service = ingest_service(settings, &repo);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(format!("Ingesting {}", bundle.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let report = service.ingest_bundle(bundle);
    spinner.finish_and_clear();
    let report = report?;

    println!("{}", style("Bundle ingested").bold());
    println!("  processed: {}", style(report.processed).green());
    println!("  skipped:   {}", report.skipped);
    if report.failed > 0 {
        println!("  failed:    {}", style(report.failed).red());
    } else {
        println!("  failed:    0");
    }
    if report.accumulation_failures > 0 {
        println!(
            "  {} document(s) persisted but not accumulated",
            style(report.accumulation_failures).yellow()
        );
    }
    println!("  total documents: {}", repo.document_count()?);
    Ok(())
}

/// Process one report file outside a bundle.
pub fn cmd_process(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let service = ingest_service(settings, &repo);

    let processed = service.process_file(file)?;
    let year = if processed.year == 0 {
        "undetected".to_string()
    } else {
        processed.year.to_string()
    };
    println!(
        "Document {} persisted (year: {}, company: {})",
        processed.document_id,
        year,
        processed.company.display_name()
    );
    if !processed.accumulated {
        println!(
            "{}",
            style("Warning: word counts were not accumulated").yellow()
        );
    }
    Ok(())
}

/// Add one company to the catalog.
pub fn cmd_company_add(settings: &Settings, name: &str, ruc: &str) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let id = repo.add_company(name, ruc)?;
    println!("Added company {} ({}) with id {}", name, ruc, id);
    Ok(())
}

/// List the company catalog in resolution order.
pub fn cmd_company_list(settings: &Settings) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let companies = repo.list_companies()?;
    if companies.is_empty() {
        println!("No companies cataloged. Seed one with: contpal company add <name> <ruc>");
        return Ok(());
    }
    for company in companies {
        println!("{:>5}  {:<15} {}", company.id, company.ruc, company.name);
    }
    Ok(())
}

/// Seed the catalog from a CSV file.
pub fn cmd_company_import(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let report = repo.import_companies(file)?;
    println!(
        "Imported {} companies, {} already existed",
        style(report.imported).green(),
        report.skipped
    );
    Ok(())
}

/// Show the most frequent words for a year.
pub fn cmd_top(settings: &Settings, year: u32, limit: usize) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let words = repo.top_words(year, limit)?;
    if words.is_empty() {
        println!("No counts recorded for year {}", year);
        return Ok(());
    }
    println!("{}", style(format!("Top words for {}", year)).bold());
    for (word, count) in words {
        println!("{:>8}  {}", count, word);
    }
    Ok(())
}

/// Check analysis tool availability.
pub fn cmd_check() -> anyhow::Result<()> {
    println!("\n{}", style("Extraction Tool Status").bold());
    println!("{}", "-".repeat(40));

    let mut all_found = true;
    for (tool, available) in ocr::check_tools() {
        let status = if available {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<12} {}", tool, status);
    }

    if !all_found {
        println!(
            "\n{}",
            style("Install poppler-utils and tesseract-ocr for PDF support").dim()
        );
    }
    Ok(())
}
