use serde::{Deserialize, Serialize};

/// Status of a download as reported by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DownloadStatus {
    Pending,
    InProgress,
    Completed,
    Failed(String),
}

impl DownloadStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, DownloadStatus::Completed | DownloadStatus::Failed(_))
    }
}

/// An entry in the download list. Progress is a percentage in `0..=100`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DownloadItem {
    pub id: String,
    pub url: String,
    pub filename: String,
    pub filepath: String,
    pub progress: u8,
    pub status: DownloadStatus,
    pub started_at: i64,
    pub completed_at: Option<i64>,
}
