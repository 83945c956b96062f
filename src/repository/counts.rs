//! Year-scoped word count accumulation.
//!
//! Counts are keyed by (year, word) across every document of that year: a
//! count row is attached to the document that first contributed the word,
//! but later documents of the same year increment it in place. The merge of
//! one document's full mapping is a single transaction, so a crash cannot
//! leave partial increments visible.

use rusqlite::{params, Connection, OptionalExtension};

use crate::analysis::WordFrequencies;

use super::{Repository, Result};

impl Repository {
    /// Merge one document's word frequencies into the year's counts.
    ///
    /// For each word: get-or-create the canonical word row, then either
    /// increment the year's existing count row or create a new one attached
    /// to the triggering document. Deliberately additive, not idempotent:
    /// accumulating the same mapping twice doubles the totals.
    pub fn accumulate(
        &self,
        document_id: i64,
        year: u32,
        frequencies: &WordFrequencies,
    ) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        for (word, quantity) in frequencies {
            let word_id = get_or_create_word(&tx, word)?;

            // Any document of this year may already hold the count row, not
            // just the triggering one.
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT c.id FROM counts c
                     JOIN documents d ON d.id = c.document_id
                     WHERE d.year = ?1 AND c.word_id = ?2",
                    params![year, word_id],
                    |row| row.get(0),
                )
                .optional()?;

            match existing {
                Some(count_id) => {
                    tx.execute(
                        "UPDATE counts SET quantity = quantity + ?1 WHERE id = ?2",
                        params![*quantity as i64, count_id],
                    )?;
                }
                None => {
                    tx.execute(
                        "INSERT INTO counts (document_id, word_id, quantity)
                         VALUES (?1, ?2, ?3)",
                        params![document_id, word_id, *quantity as i64],
                    )?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Most frequent words for a year, highest count first.
    pub fn top_words(&self, year: u32, limit: usize) -> Result<Vec<(String, u64)>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT w.word, c.quantity FROM counts c
             JOIN words w ON w.id = c.word_id
             JOIN documents d ON d.id = c.document_id
             WHERE d.year = ?1
             ORDER BY c.quantity DESC, c.id
             LIMIT ?2",
        )?;
        let words = stmt
            .query_map(params![year, limit as i64], |row| {
                Ok((row.get(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(words)
    }

    /// Running total for one word in one year, if any document contributed it.
    pub fn word_total(&self, year: u32, word: &str) -> Result<Option<u64>> {
        let conn = self.connect()?;
        let total: Option<i64> = conn
            .query_row(
                "SELECT c.quantity FROM counts c
                 JOIN words w ON w.id = c.word_id
                 JOIN documents d ON d.id = c.document_id
                 WHERE d.year = ?1 AND w.word = ?2",
                params![year, word],
                |row| row.get(0),
            )
            .optional()?;
        Ok(total.map(|t| t as u64))
    }
}

/// Get-or-create the canonical row for a word.
///
/// Words are unique by text and created on first observation, then reused
/// forever across documents and years.
fn get_or_create_word(conn: &Connection, word: &str) -> Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM words WHERE word = ?1",
            params![word],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute("INSERT INTO words (word) VALUES (?1)", params![word])?;
    Ok(conn.last_insert_rowid())
}
