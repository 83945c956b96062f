//! Repository layer for SQLite persistence.
//!
//! One `Repository` owns the database path and the directory where raw
//! document bytes are stored. Connections are opened per operation; the
//! count accumulation runs inside a single transaction per document.

mod companies;
mod counts;
mod documents;

pub use companies::ImportReport;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;
use thiserror::Error;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Company already exists: {0}")]
    DuplicateCompany(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// SQLite-backed store for documents, companies, words and counts.
pub struct Repository {
    db_path: PathBuf,
    documents_dir: PathBuf,
}

impl Repository {
    /// Open (or create) the store under a data directory.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let documents_dir = data_dir.join("documents");
        std::fs::create_dir_all(&documents_dir)?;

        let repo = Self {
            db_path: data_dir.join("contpal.db"),
            documents_dir,
        };
        repo.init_schema()?;
        Ok(repo)
    }

    pub(crate) fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        // Guards against a concurrent writer from another process.
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS companies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ruc TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                file_path TEXT NOT NULL,
                company_id INTEGER REFERENCES companies(id),
                year INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS words (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS counts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document_id INTEGER NOT NULL REFERENCES documents(id),
                word_id INTEGER NOT NULL REFERENCES words(id),
                quantity INTEGER NOT NULL,
                UNIQUE (document_id, word_id)
            );

            CREATE INDEX IF NOT EXISTS idx_documents_year ON documents(year);
            CREATE INDEX IF NOT EXISTS idx_counts_word ON counts(word_id);
            "#,
        )?;
        Ok(())
    }

    /// Get the database path.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Get the documents directory path.
    pub fn documents_dir(&self) -> &Path {
        &self.documents_dir
    }
}

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub(crate) fn parse_datetime(s: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .unwrap_or(chrono::DateTime::UNIX_EPOCH)
}

/// Sanitize a filename for on-disk storage.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    let trimmed = sanitized.trim_matches('_');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        sanitized.chars().take(100).collect()
    }
}
