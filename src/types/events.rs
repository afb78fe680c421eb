//! Messages flowing between the engine, the coordinator and the shell UI.

use serde::{Deserialize, Serialize};

use super::settings::ThemeMode;

/// A lifecycle report from one tab's view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewEvent {
    pub tab_id: String,
    pub kind: ViewEventKind,
}

impl ViewEvent {
    pub fn new(tab_id: impl Into<String>, kind: ViewEventKind) -> Self {
        Self {
            tab_id: tab_id.into(),
            kind,
        }
    }
}

/// What the engine reported.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEventKind {
    LoadStarted,
    LoadFinished { ok: bool },
    UrlChanged(String),
    TitleChanged(String),
    DownloadStarted { url: String, path: String },
    DownloadProgress { url: String, percent: u8 },
    DownloadFinished { url: String, success: bool },
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A one-shot message for the user (the shell shows it as a dialog or toast).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Signals from the coordinator to whatever renders the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    /// Bookmarks or history may have changed; re-read `App::sidebar()`.
    SidebarRefresh,
    /// Tab set, order, labels or the active tab changed.
    TabsChanged,
    /// The download list changed.
    DownloadsChanged,
    StatusMessage(String),
    UrlBarText(String),
    ThemeApplied { mode: ThemeMode, stylesheet: String },
    Notice(Notice),
}
