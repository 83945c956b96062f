//! Document persistence.

use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::models::Document;

use super::{sanitize_filename, Repository, Result};

impl Repository {
    /// Persist a document: raw bytes to disk, row to the database.
    ///
    /// The uploaded byte stream is retained verbatim; the stored filename is
    /// prefixed with a content hash so colliding entry names from different
    /// bundles never overwrite each other.
    pub fn create_document(
        &self,
        filename: &str,
        bytes: &[u8],
        company_id: Option<i64>,
        year: u32,
    ) -> Result<i64> {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hex::encode(hasher.finalize());

        let stored_name = format!("{}_{}", &digest[..12], sanitize_filename(filename));
        let file_path = self.documents_dir().join(&stored_name);
        std::fs::write(&file_path, bytes)?;

        // If the row never lands, the blob on disk must not linger either.
        match self.insert_document_row(filename, &file_path, company_id, year) {
            Ok(id) => Ok(id),
            Err(e) => {
                let _ = std::fs::remove_file(&file_path);
                Err(e)
            }
        }
    }

    fn insert_document_row(
        &self,
        filename: &str,
        file_path: &std::path::Path,
        company_id: Option<i64>,
        year: u32,
    ) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO documents (filename, file_path, company_id, year, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                filename,
                file_path.to_string_lossy(),
                company_id,
                year,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a document by ID.
    pub fn get_document(&self, id: i64) -> Result<Option<Document>> {
        let conn = self.connect()?;
        let doc = conn
            .query_row(
                "SELECT id, filename, file_path, company_id, year, created_at
                 FROM documents WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Document {
                        id: row.get(0)?,
                        filename: row.get(1)?,
                        file_path: PathBuf::from(row.get::<_, String>(2)?),
                        company_id: row.get(3)?,
                        year: row.get(4)?,
                        created_at: super::parse_datetime(&row.get::<_, String>(5)?),
                    })
                },
            )
            .optional()?;
        Ok(doc)
    }

    /// Total number of persisted documents.
    pub fn document_count(&self) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get_document() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(dir.path()).unwrap();

        let id = repo
            .create_document("informe 2021.pdf", b"raw pdf bytes", None, 2021)
            .unwrap();
        let doc = repo.get_document(id).unwrap().unwrap();

        assert_eq!(doc.filename, "informe 2021.pdf");
        assert_eq!(doc.year, 2021);
        assert_eq!(doc.company_id, None);
        assert_eq!(std::fs::read(&doc.file_path).unwrap(), b"raw pdf bytes");
    }

    #[test]
    fn test_same_filename_different_bytes_kept_apart() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(dir.path()).unwrap();

        let a = repo.create_document("informe.txt", b"primero", None, 0).unwrap();
        let b = repo.create_document("informe.txt", b"segundo", None, 0).unwrap();

        let doc_a = repo.get_document(a).unwrap().unwrap();
        let doc_b = repo.get_document(b).unwrap().unwrap();
        assert_ne!(doc_a.file_path, doc_b.file_path);
        assert_eq!(repo.document_count().unwrap(), 2);
    }

    #[test]
    fn test_failed_insert_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(dir.path()).unwrap();

        let conn = rusqlite::Connection::open(repo.database_path()).unwrap();
        conn.execute_batch("DROP TABLE documents;").unwrap();

        let result = repo.create_document("informe.txt", b"contenido", None, 2021);
        assert!(result.is_err());
        assert_eq!(
            std::fs::read_dir(repo.documents_dir()).unwrap().count(),
            0,
            "documents dir should stay empty when the row insert fails"
        );
    }
}
