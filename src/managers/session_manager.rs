//! Session Manager for Val Browser.
//!
//! Saves the open tab URLs and the active index to `session.json` on exit and
//! reads them back on startup. A missing file is the normal "no session" case.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::platform;
use crate::types::errors::SessionError;
use crate::types::session::SessionData;

/// File name used inside the data directory.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Trait defining session management operations.
pub trait SessionManagerTrait {
    fn save_session(&self, data: &SessionData) -> Result<(), SessionError>;
    fn restore_session(&self) -> Result<Option<SessionData>, SessionError>;
    fn has_session(&self) -> bool;
    fn clear_session(&self) -> Result<(), SessionError>;
}

/// File-backed session store.
pub struct SessionManager {
    path: PathBuf,
}

impl SessionManager {
    /// Uses `path_override` when given, else `<data_dir>/session.json`.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let path = path_override.unwrap_or_else(|| platform::get_data_dir().join(SESSION_FILE_NAME));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionManagerTrait for SessionManager {
    fn save_session(&self, data: &SessionData) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SessionError::IoError(e.to_string()))?;
        }
        let json =
            serde_json::to_string(data).map_err(|e| SessionError::SerializationError(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| SessionError::IoError(e.to_string()))?;
        log::info!("saved {} tab(s) to {}", data.tabs.len(), self.path.display());
        Ok(())
    }

    /// `Ok(None)` when no session was saved; a malformed file is an error.
    fn restore_session(&self) -> Result<Option<SessionData>, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::IoError(e.to_string())),
        };
        let data: SessionData = serde_json::from_str(&content)
            .map_err(|e| SessionError::SerializationError(e.to_string()))?;
        Ok(Some(data))
    }

    fn has_session(&self) -> bool {
        self.path.is_file()
    }

    fn clear_session(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::IoError(e.to_string())),
        }
    }
}
