//! History Manager for Val Browser.
//!
//! An append-only navigation log over the SQLite `history` table. Entries are
//! listed in the order they were recorded and repeats are kept.

use std::sync::Arc;

use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::types::errors::HistoryError;
use crate::types::history::HistoryEntry;

/// Trait defining history management operations.
pub trait HistoryManagerTrait {
    fn record_visit(&mut self, url: &str) -> Result<String, HistoryError>;
    fn list_history(&self) -> Result<Vec<HistoryEntry>, HistoryError>;
    fn search_history(&self, query: &str) -> Result<Vec<HistoryEntry>, HistoryError>;
    fn clear_all(&mut self) -> Result<(), HistoryError>;
    fn len(&self) -> Result<usize, HistoryError>;
}

/// History manager backed by the shared database.
pub struct HistoryManager {
    db: Arc<Database>,
}

fn db_err(e: rusqlite::Error) -> HistoryError {
    HistoryError::DatabaseError(e.to_string())
}

/// Escapes LIKE wildcards so the text matches literally under `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl HistoryManager {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<HistoryEntry> {
        Ok(HistoryEntry {
            id: row.get(0)?,
            url: row.get(1)?,
            visit_time: row.get(2)?,
        })
    }

    fn query(&self, sql: &str, arg: Option<&str>) -> Result<Vec<HistoryEntry>, HistoryError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        let rows = match arg {
            Some(a) => stmt.query_map(params![a], Self::row_to_entry),
            None => stmt.query_map([], Self::row_to_entry),
        }
        .map_err(db_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }
}

impl HistoryManagerTrait for HistoryManager {
    fn record_visit(&mut self, url: &str) -> Result<String, HistoryError> {
        let id = Uuid::new_v4().to_string();
        self.db
            .connection()
            .execute(
                "INSERT INTO history (id, url, visit_time) VALUES (?1, ?2, ?3)",
                params![id, url, chrono::Utc::now().timestamp()],
            )
            .map_err(db_err)?;
        log::debug!("history += {}", url);
        Ok(id)
    }

    fn list_history(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        self.query("SELECT id, url, visit_time FROM history ORDER BY seq ASC", None)
    }

    /// Case-insensitive substring match on the URL. `%` and `_` in the
    /// query match themselves.
    fn search_history(&self, query: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let pattern = format!("%{}%", escape_like(query));
        self.query(
            "SELECT id, url, visit_time FROM history WHERE url LIKE ?1 ESCAPE '\\' ORDER BY seq ASC",
            Some(&pattern),
        )
    }

    fn clear_all(&mut self) -> Result<(), HistoryError> {
        self.db
            .connection()
            .execute("DELETE FROM history", [])
            .map_err(db_err)?;
        Ok(())
    }

    fn len(&self) -> Result<usize, HistoryError> {
        let n: i64 = self
            .db
            .connection()
            .query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))
            .map_err(db_err)?;
        Ok(n as usize)
    }
}
