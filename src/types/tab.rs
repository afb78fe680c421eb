use serde::{Deserialize, Serialize};

/// Label given to freshly opened tabs, and restored when unpinning a tab
/// that never had a title of its own.
pub const DEFAULT_TAB_LABEL: &str = "New Tab";

/// Label shown for a tab while it is pinned.
pub const PINNED_TAB_LABEL: &str = "Pinned";

/// Display state of one browsing context. The view itself is owned by the
/// tab registry alongside this record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tab {
    pub id: String,
    pub label: String,
    pub pinned: bool,
    /// Last URL reported by the view; never written by navigation commands.
    pub current_url: String,
    pub loading: bool,
    pub created_at: i64,
    /// Label to restore on unpin. Tracks title changes while pinned.
    #[serde(default)]
    pub unpinned_label: Option<String>,
}
