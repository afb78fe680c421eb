use thiserror::Error;

// === TabError ===

/// Errors related to tab registry operations.
#[derive(Debug, Error)]
pub enum TabError {
    /// Tab with the given ID was not found.
    #[error("Tab not found: {0}")]
    NotFound(String),
    /// The provided tab index is out of bounds.
    #[error("Invalid tab index: {0}")]
    InvalidIndex(usize),
    /// A command needed an active tab but the registry is empty.
    #[error("No active tab")]
    NoActiveTab,
}

// === BookmarkError ===

/// Errors related to bookmark management operations.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// Bookmark with the given ID was not found.
    #[error("Bookmark not found: {0}")]
    NotFound(String),
    /// A bookmark with the same URL already exists.
    #[error("Duplicate bookmark URL: {0}")]
    DuplicateUrl(String),
    /// Database operation failed.
    #[error("Bookmark database error: {0}")]
    DatabaseError(String),
}

// === HistoryError ===

/// Errors related to browsing history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Database operation failed.
    #[error("History database error: {0}")]
    DatabaseError(String),
}

// === DownloadError ===

/// Errors related to the download list.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// No tracked download matches the given key.
    #[error("Download not found: {0}")]
    NotFound(String),
    /// The download has already finished.
    #[error("Download already finished: {0}")]
    AlreadyFinished(String),
    /// Database operation failed.
    #[error("Download database error: {0}")]
    DatabaseError(String),
}

// === SessionError ===

/// Errors related to session save/restore.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the session file failed.
    #[error("Session I/O error: {0}")]
    IoError(String),
    /// The session file could not be serialized or parsed.
    #[error("Session serialization error: {0}")]
    SerializationError(String),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === UpdateError ===

/// Errors raised while checking for a newer release.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The release endpoint could not be reached or answered with an error status.
    #[error("Update network error: {0}")]
    NetworkError(String),
    /// The release metadata was not the expected JSON shape.
    #[error("Update parse error: {0}")]
    ParseError(String),
}

// === AppError ===

/// Errors surfaced by the shell coordinator.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Tab(#[from] TabError),
    #[error(transparent)]
    Bookmark(#[from] BookmarkError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Update(#[from] UpdateError),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
