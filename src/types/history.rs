use serde::{Deserialize, Serialize};

/// One recorded navigation. Repeated visits produce repeated entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    pub url: String,
    pub visit_time: i64,
}
