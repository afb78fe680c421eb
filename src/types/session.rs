use serde::{Deserialize, Serialize};

/// Contents of `session.json`: the open tab URLs in display order and the
/// index of the active one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionData {
    pub tabs: Vec<String>,
    pub current_tab: Option<usize>,
}

/// What happens to the open tabs when the browser exits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SessionExitPolicy {
    /// Ask the user every time (console mode treats this as "no").
    #[default]
    Ask,
    Always,
    Never,
}
