//! Navigation Request Filter.
//!
//! Each view gets its own filter instance at creation time; the engine asks it
//! about every navigation and sub-resource request before loading.

/// Verdict for one outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Allow,
    Block,
}

impl FilterDecision {
    pub fn is_blocked(self) -> bool {
        self == FilterDecision::Block
    }
}

/// Per-view request policy. Must be a total function over URL strings.
pub trait RequestFilter: Send + Sync {
    fn decide(&self, request_url: &str) -> FilterDecision;
}

/// Substrings that block a request wherever they occur in the URL.
const BLOCKED_SUBSTRINGS: &[&str] = &["popup"];

/// Prefixes that block a request.
const BLOCKED_PREFIXES: &[&str] = &["about:blank"];

/// Blocks pop-up style requests: anything whose URL mentions `popup`, and
/// blank documents. Matching is ASCII case-insensitive on the raw string and
/// does not look at the request type, so a page path such as `/popups/` is
/// blocked as well.
#[derive(Debug, Default, Clone, Copy)]
pub struct PopupFilter;

impl PopupFilter {
    pub fn new() -> Self {
        Self
    }
}

impl RequestFilter for PopupFilter {
    fn decide(&self, request_url: &str) -> FilterDecision {
        let url_lower = request_url.to_ascii_lowercase();
        let blocked = BLOCKED_SUBSTRINGS.iter().any(|pat| url_lower.contains(pat))
            || BLOCKED_PREFIXES.iter().any(|pre| url_lower.starts_with(pre));
        if blocked {
            log::debug!("request blocked: {}", request_url);
            FilterDecision::Block
        } else {
            FilterDecision::Allow
        }
    }
}
