//! Bookmark Manager for Val Browser.
//!
//! Implements `BookmarkManagerTrait` over the SQLite `bookmarks` table. A URL
//! can be bookmarked at most once.

use std::sync::Arc;

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::database::Database;
use crate::types::bookmark::Bookmark;
use crate::types::errors::BookmarkError;

/// Trait defining bookmark management operations.
pub trait BookmarkManagerTrait {
    fn add_bookmark(&mut self, url: &str, title: &str) -> Result<String, BookmarkError>;
    fn remove_bookmark(&mut self, id: &str) -> Result<(), BookmarkError>;
    fn list_bookmarks(&self) -> Result<Vec<Bookmark>, BookmarkError>;
    fn contains(&self, url: &str) -> Result<bool, BookmarkError>;
}

/// Bookmark manager backed by the shared database.
pub struct BookmarkManager {
    db: Arc<Database>,
}

fn db_err(e: rusqlite::Error) -> BookmarkError {
    BookmarkError::DatabaseError(e.to_string())
}

impl BookmarkManager {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn next_position(&self) -> Result<i32, BookmarkError> {
        self.db
            .connection()
            .query_row(
                "SELECT COALESCE(MAX(position), -1) + 1 FROM bookmarks",
                [],
                |row| row.get(0),
            )
            .map_err(db_err)
    }

    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            position: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl BookmarkManagerTrait for BookmarkManager {
    /// Returns the new bookmark's ID, or `DuplicateUrl` if the URL is already saved.
    fn add_bookmark(&mut self, url: &str, title: &str) -> Result<String, BookmarkError> {
        if self.contains(url)? {
            return Err(BookmarkError::DuplicateUrl(url.to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let position = self.next_position()?;
        self.db
            .connection()
            .execute(
                "INSERT INTO bookmarks (id, url, title, position, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, url, title, position, chrono::Utc::now().timestamp()],
            )
            .map_err(db_err)?;

        log::info!("bookmarked {}", url);
        Ok(id)
    }

    fn remove_bookmark(&mut self, id: &str) -> Result<(), BookmarkError> {
        let affected = self
            .db
            .connection()
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])
            .map_err(db_err)?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// All bookmarks in the order they were added.
    fn list_bookmarks(&self) -> Result<Vec<Bookmark>, BookmarkError> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare("SELECT id, url, title, position, created_at FROM bookmarks ORDER BY position ASC")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], Self::row_to_bookmark)
            .map_err(db_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }

    fn contains(&self, url: &str) -> Result<bool, BookmarkError> {
        let found: Option<String> = self
            .db
            .connection()
            .query_row("SELECT id FROM bookmarks WHERE url = ?1", params![url], |row| row.get(0))
            .optional()
            .map_err(db_err)?;
        Ok(found.is_some())
    }
}
