//! Per-tab back/forward stacks.
//!
//! Tracks committed pages only. A step back or forward is split into peeking
//! at the target and committing the move, so an engine can run the target
//! through the request filter before the stacks change.

/// Navigation state of one tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavStack {
    back: Vec<String>,
    forward: Vec<String>,
    current: String,
}

impl NavStack {
    /// The page on screen, empty before the first commit.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Records a page the engine finished loading. A new URL pushes the
    /// previous page onto the back stack and drops the forward stack; the
    /// same URL again (a reload or a tab coming back on screen) is a no-op.
    /// Returns whether the stacks changed.
    pub fn commit(&mut self, url: &str) -> bool {
        if url.is_empty() || url == self.current {
            return false;
        }
        let previous = std::mem::replace(&mut self.current, url.to_string());
        if !previous.is_empty() {
            self.back.push(previous);
        }
        self.forward.clear();
        true
    }

    pub fn back_target(&self) -> Option<&str> {
        self.back.last().map(String::as_str)
    }

    pub fn forward_target(&self) -> Option<&str> {
        self.forward.last().map(String::as_str)
    }

    /// Moves one step back and returns the new current page.
    pub fn go_back(&mut self) -> Option<String> {
        let target = self.back.pop()?;
        let leaving = std::mem::replace(&mut self.current, target.clone());
        self.forward.push(leaving);
        Some(target)
    }

    /// Moves one step forward and returns the new current page.
    pub fn go_forward(&mut self) -> Option<String> {
        let target = self.forward.pop()?;
        let leaving = std::mem::replace(&mut self.current, target.clone());
        self.back.push(leaving);
        Some(target)
    }
}
