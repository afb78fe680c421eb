//! Download Manager for Val Browser.
//!
//! Keeps the download list shown by the download dialog. The engine performs
//! the transfer and reports start, progress and completion by URL; this
//! manager only tracks what it is told, cached in memory and mirrored to SQLite.

use std::sync::Arc;

use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::types::download::{DownloadItem, DownloadStatus};
use crate::types::errors::DownloadError;

/// Trait defining download list operations.
pub trait DownloadManagerTrait {
    fn register(&mut self, url: &str, filepath: &str) -> Result<String, DownloadError>;
    fn update_progress(&mut self, url: &str, percent: u8) -> Result<(), DownloadError>;
    fn finish(&mut self, url: &str, success: bool) -> Result<(), DownloadError>;
    fn list_downloads(&self) -> Vec<&DownloadItem>;
    fn get_download(&self, id: &str) -> Option<&DownloadItem>;
    fn clear_finished(&mut self) -> Result<usize, DownloadError>;
}

fn status_to_str(s: &DownloadStatus) -> String {
    match s {
        DownloadStatus::Pending => "pending".to_string(),
        DownloadStatus::InProgress => "in_progress".to_string(),
        DownloadStatus::Completed => "completed".to_string(),
        DownloadStatus::Failed(msg) => format!("failed:{}", msg),
    }
}

fn str_to_status(s: &str) -> DownloadStatus {
    match s {
        "in_progress" => DownloadStatus::InProgress,
        "completed" => DownloadStatus::Completed,
        other => match other.strip_prefix("failed:") {
            Some(reason) => DownloadStatus::Failed(reason.to_string()),
            None => DownloadStatus::Pending,
        },
    }
}

fn db_err(e: rusqlite::Error) -> DownloadError {
    DownloadError::DatabaseError(e.to_string())
}

/// Download list backed by SQLite with an in-memory cache, oldest first.
pub struct DownloadManager {
    db: Arc<Database>,
    downloads: Vec<DownloadItem>,
}

impl DownloadManager {
    pub fn new(db: Arc<Database>) -> Result<Self, DownloadError> {
        let mut mgr = Self {
            db,
            downloads: Vec::new(),
        };
        mgr.load_from_db()?;
        Ok(mgr)
    }

    fn load_from_db(&mut self) -> Result<(), DownloadError> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(
                "SELECT id, url, filename, filepath, progress, status, started_at, completed_at FROM downloads ORDER BY seq ASC",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], |row| {
                let status: String = row.get(5)?;
                Ok(DownloadItem {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    filename: row.get(2)?,
                    filepath: row.get(3)?,
                    progress: row.get::<_, i64>(4)?.clamp(0, 100) as u8,
                    status: str_to_status(&status),
                    started_at: row.get(6)?,
                    completed_at: row.get(7)?,
                })
            })
            .map_err(db_err)?;
        self.downloads = rows.collect::<Result<Vec<_>, _>>().map_err(db_err)?;
        Ok(())
    }

    /// The most recent unfinished download for `url`.
    fn find_active(&self, url: &str) -> Result<usize, DownloadError> {
        self.downloads
            .iter()
            .rposition(|d| d.url == url && !d.status.is_finished())
            .ok_or_else(|| DownloadError::NotFound(url.to_string()))
    }

    fn persist(&self, item: &DownloadItem) -> Result<(), DownloadError> {
        self.db
            .connection()
            .execute(
                "INSERT INTO downloads (id, url, filename, filepath, progress, status, started_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET progress = excluded.progress,
                     status = excluded.status, completed_at = excluded.completed_at",
                params![
                    item.id,
                    item.url,
                    item.filename,
                    item.filepath,
                    item.progress as i64,
                    status_to_str(&item.status),
                    item.started_at,
                    item.completed_at
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }
}

impl DownloadManagerTrait for DownloadManager {
    fn register(&mut self, url: &str, filepath: &str) -> Result<String, DownloadError> {
        let id = Uuid::new_v4().to_string();
        let filename = filepath
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(filepath)
            .to_string();

        let item = DownloadItem {
            id: id.clone(),
            url: url.to_string(),
            filename,
            filepath: filepath.to_string(),
            progress: 0,
            status: DownloadStatus::Pending,
            started_at: chrono::Utc::now().timestamp(),
            completed_at: None,
        };

        self.persist(&item)?;
        log::info!("download started: {} -> {}", url, filepath);
        self.downloads.push(item);
        Ok(id)
    }

    /// Progress above 100 is clamped.
    fn update_progress(&mut self, url: &str, percent: u8) -> Result<(), DownloadError> {
        let idx = self.find_active(url)?;
        let item = &mut self.downloads[idx];
        item.progress = percent.min(100);
        item.status = DownloadStatus::InProgress;
        let snapshot = item.clone();
        self.persist(&snapshot)
    }

    fn finish(&mut self, url: &str, success: bool) -> Result<(), DownloadError> {
        let idx = match self.find_active(url) {
            Ok(idx) => idx,
            Err(_) if self.downloads.iter().any(|d| d.url == url) => {
                return Err(DownloadError::AlreadyFinished(url.to_string()));
            }
            Err(e) => return Err(e),
        };
        let item = &mut self.downloads[idx];
        if success {
            item.progress = 100;
            item.status = DownloadStatus::Completed;
        } else {
            item.status = DownloadStatus::Failed("Download failed".to_string());
        }
        item.completed_at = Some(chrono::Utc::now().timestamp());
        let snapshot = item.clone();
        log::info!("download finished: {} ({:?})", url, snapshot.status);
        self.persist(&snapshot)
    }

    fn list_downloads(&self) -> Vec<&DownloadItem> {
        self.downloads.iter().collect()
    }

    fn get_download(&self, id: &str) -> Option<&DownloadItem> {
        self.downloads.iter().find(|d| d.id == id)
    }

    /// Drops completed and failed entries; returns how many were removed.
    fn clear_finished(&mut self) -> Result<usize, DownloadError> {
        self.db
            .connection()
            .execute(
                "DELETE FROM downloads WHERE status = 'completed' OR status LIKE 'failed:%'",
                [],
            )
            .map_err(db_err)?;
        let before = self.downloads.len();
        self.downloads.retain(|d| !d.status.is_finished());
        Ok(before - self.downloads.len())
    }
}
