//! Company catalog persistence and CSV seeding.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::Deserialize;
use tracing::info;

use crate::models::Company;

use super::{Repository, RepositoryError, Result};

/// Outcome of a catalog import.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// One row of the company seed file.
#[derive(Debug, Deserialize)]
struct CompanyRow {
    name: String,
    ruc: String,
}

impl Repository {
    /// Add one company to the catalog.
    pub fn add_company(&self, name: &str, ruc: &str) -> Result<i64> {
        if self.company_exists(name, ruc)? {
            return Err(RepositoryError::DuplicateCompany(format!(
                "{} (RUC {})",
                name, ruc
            )));
        }

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO companies (ruc, name, created_at) VALUES (?1, ?2, ?3)",
            params![ruc, name, Utc::now().to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Whether a company with this name or RUC is already cataloged.
    pub fn company_exists(&self, name: &str, ruc: &str) -> Result<bool> {
        let conn = self.connect()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM companies WHERE name = ?1 OR ruc = ?2",
                params![name, ruc],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// List the catalog in insertion order.
    ///
    /// Resolution scans companies in this order; the first sufficiently
    /// similar match wins.
    pub fn list_companies(&self) -> Result<Vec<Company>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, ruc, name FROM companies ORDER BY id")?;
        let companies = stmt
            .query_map([], |row| {
                Ok(Company {
                    id: row.get(0)?,
                    ruc: row.get(1)?,
                    name: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(companies)
    }

    /// Seed the catalog from a CSV file with `name,ruc` columns.
    ///
    /// Entries whose name or RUC is already cataloged are skipped, matching
    /// how seed files get re-imported after edits.
    pub fn import_companies(&self, csv_path: &Path) -> Result<ImportReport> {
        let mut reader = csv::Reader::from_path(csv_path)?;
        let mut report = ImportReport::default();

        for row in reader.deserialize() {
            let row: CompanyRow = row?;
            if self.company_exists(&row.name, &row.ruc)? {
                info!("company '{}' (RUC {}) already exists, skipped", row.name, row.ruc);
                report.skipped += 1;
                continue;
            }
            self.add_company(&row.name, &row.ruc)?;
            report.imported += 1;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_list_in_catalog_order() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(dir.path()).unwrap();

        repo.add_company("Plasticos Rival", "1790012345001").unwrap();
        repo.add_company("Telconet", "0990054321001").unwrap();

        let companies = repo.list_companies().unwrap();
        let names: Vec<&str> = companies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Plasticos Rival", "Telconet"]);
    }

    #[test]
    fn test_duplicate_ruc_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(dir.path()).unwrap();

        repo.add_company("Plasticos Rival", "1790012345001").unwrap();
        let err = repo.add_company("Otra Empresa", "1790012345001").unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateCompany(_)));
    }

    #[test]
    fn test_import_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        repo.add_company("Telconet", "0990054321001").unwrap();

        let csv_path = dir.path().join("empresas.csv");
        std::fs::write(
            &csv_path,
            "name,ruc\nPlasticos Rival,1790012345001\nTelconet,0990054321001\n",
        )
        .unwrap();

        let report = repo.import_companies(&csv_path).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(repo.list_companies().unwrap().len(), 2);
    }
}
