use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crossbeam_channel::Sender;
use uuid::Uuid;

use crate::services::request_filter::PopupFilter;
use crate::types::errors::TabError;
use crate::types::events::ShellEvent;
use crate::types::tab::{Tab, DEFAULT_TAB_LABEL, PINNED_TAB_LABEL};
use crate::view::{BrowserView, ViewFactory};

/// Trait defining the tab registry interface.
pub trait TabManagerTrait {
    fn open(&mut self, url: Option<&str>) -> String;
    fn close(&mut self, tab_id: &str) -> Result<(), TabError>;
    fn set_active(&mut self, tab_id: &str) -> Result<(), TabError>;
    fn toggle_pin(&mut self, tab_id: &str) -> Result<bool, TabError>;
    fn reorder(&mut self, tab_id: &str, new_index: usize) -> Result<(), TabError>;
    fn navigate_active(&mut self, raw_input: &str) -> Result<String, TabError>;
    fn go_to(&mut self, url: &str) -> Result<(), TabError>;
    fn back(&mut self) -> Result<(), TabError>;
    fn forward(&mut self) -> Result<(), TabError>;
    fn reload(&mut self) -> Result<(), TabError>;
    fn apply_url_change(&mut self, tab_id: &str, url: &str) -> Result<(), TabError>;
    fn apply_title_change(&mut self, tab_id: &str, title: &str) -> Result<(), TabError>;
    fn set_loading(&mut self, tab_id: &str, loading: bool) -> Result<(), TabError>;
    fn run_script_in_active(&mut self, script: &str) -> Result<(), TabError>;
    fn get_tab(&self, tab_id: &str) -> Option<&Tab>;
    fn get_all_tabs(&self) -> Vec<&Tab>;
    fn get_active_tab(&self) -> Option<&Tab>;
    fn active_index(&self) -> Option<usize>;
    fn tab_count(&self) -> usize;
}

/// Prefixes `https://` unless the input already names `http://` or `https://`.
/// Nothing else is validated; the engine reports bad targets itself.
pub fn normalize_url(raw_input: &str) -> String {
    if raw_input.starts_with("http://") || raw_input.starts_with("https://") {
        raw_input.to_string()
    } else {
        format!("https://{}", raw_input)
    }
}

/// A tab record and the view it exclusively owns.
struct TabEntry {
    tab: Tab,
    view: Box<dyn BrowserView>,
}

/// Ordered set of open tabs with at most one active entry.
///
/// Display order is the order of `entries`. `active` is always a valid index
/// while any tab is open and `None` once the last tab is closed.
pub struct TabManager {
    entries: Vec<TabEntry>,
    active: Option<usize>,
    factory: Box<dyn ViewFactory>,
    home_url: String,
    notifier: Sender<ShellEvent>,
}

impl TabManager {
    pub fn new(factory: Box<dyn ViewFactory>, home_url: &str, notifier: Sender<ShellEvent>) -> Self {
        Self {
            entries: Vec::new(),
            active: None,
            factory,
            home_url: home_url.to_string(),
            notifier,
        }
    }

    pub fn home_url(&self) -> &str {
        &self.home_url
    }

    /// Target used by `open(None)` from now on. Open tabs are not touched.
    pub fn set_home_url(&mut self, url: &str) {
        self.home_url = url.to_string();
    }

    /// URL each tab's view was last sent to, in display order. A blocked
    /// target still counts so the tab reopens where it was pointed.
    pub fn current_urls(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                let url = e.view.current_url();
                if url.is_empty() {
                    e.tab.current_url.clone()
                } else {
                    url
                }
            })
            .collect()
    }

    pub fn index_of(&self, tab_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.tab.id == tab_id)
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn find(&self, tab_id: &str) -> Result<usize, TabError> {
        self.index_of(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))
    }

    fn active_view(&mut self) -> Result<&mut Box<dyn BrowserView>, TabError> {
        let idx = self.active.ok_or(TabError::NoActiveTab)?;
        Ok(&mut self.entries[idx].view)
    }

    fn notify_changed(&self) {
        // Nobody listening is fine, e.g. during shutdown
        let _ = self.notifier.send(ShellEvent::TabsChanged);
        let _ = self.notifier.send(ShellEvent::SidebarRefresh);
    }
}

impl TabManagerTrait for TabManager {
    /// Opens `url` (or the home URL) in a new tab with its own request filter,
    /// appends it and makes it active. Returns the new tab's ID.
    fn open(&mut self, url: Option<&str>) -> String {
        let id = Uuid::new_v4().to_string();
        let target = url.unwrap_or(&self.home_url).to_string();

        let mut view = self.factory.create_view(&id, Arc::new(PopupFilter::new()));
        let tab = Tab {
            id: id.clone(),
            label: DEFAULT_TAB_LABEL.to_string(),
            pinned: false,
            current_url: String::new(),
            loading: false,
            created_at: Self::now(),
            unpinned_label: None,
        };
        view.load(&target);

        self.entries.push(TabEntry { tab, view });
        self.active = Some(self.entries.len() - 1);
        log::debug!("opened tab {} at {}", id, target);
        self.notify_changed();
        id
    }

    /// Removes a tab. A closed active tab hands activation to whichever tab
    /// now holds its position, or to the new last tab. Closing the only tab
    /// leaves the registry empty.
    fn close(&mut self, tab_id: &str) -> Result<(), TabError> {
        let idx = self.find(tab_id)?;
        self.entries.remove(idx);

        self.active = match self.active {
            _ if self.entries.is_empty() => None,
            Some(active) if active == idx => Some(idx.min(self.entries.len() - 1)),
            Some(active) if active > idx => Some(active - 1),
            other => other,
        };

        log::debug!("closed tab {}", tab_id);
        self.notify_changed();
        Ok(())
    }

    fn set_active(&mut self, tab_id: &str) -> Result<(), TabError> {
        let idx = self.find(tab_id)?;
        self.active = Some(idx);
        self.notify_changed();
        Ok(())
    }

    /// Flips the pinned flag. Pinned tabs read "Pinned"; unpinning restores
    /// the label the tab had before, or "New Tab". Returns the new state.
    fn toggle_pin(&mut self, tab_id: &str) -> Result<bool, TabError> {
        let idx = self.find(tab_id)?;
        let tab = &mut self.entries[idx].tab;

        if tab.pinned {
            tab.pinned = false;
            tab.label = tab
                .unpinned_label
                .take()
                .unwrap_or_else(|| DEFAULT_TAB_LABEL.to_string());
        } else {
            tab.pinned = true;
            let previous = std::mem::replace(&mut tab.label, PINNED_TAB_LABEL.to_string());
            tab.unpinned_label = Some(previous);
        }

        let pinned = tab.pinned;
        self.notify_changed();
        Ok(pinned)
    }

    /// Moves a tab to `new_index`. The active tab stays the same tab.
    fn reorder(&mut self, tab_id: &str, new_index: usize) -> Result<(), TabError> {
        let idx = self.find(tab_id)?;
        if new_index >= self.entries.len() {
            return Err(TabError::InvalidIndex(new_index));
        }

        let active_id = self.active.map(|a| self.entries[a].tab.id.clone());
        let entry = self.entries.remove(idx);
        self.entries.insert(new_index, entry);
        self.active = active_id.and_then(|id| self.index_of(&id));

        self.notify_changed();
        Ok(())
    }

    /// Loads user input in the active tab and returns the URL actually requested.
    fn navigate_active(&mut self, raw_input: &str) -> Result<String, TabError> {
        let target = normalize_url(raw_input);
        self.active_view()?.load(&target);
        self.notify_changed();
        Ok(target)
    }

    /// Loads `url` verbatim in the active tab.
    fn go_to(&mut self, url: &str) -> Result<(), TabError> {
        self.active_view()?.load(url);
        self.notify_changed();
        Ok(())
    }

    fn back(&mut self) -> Result<(), TabError> {
        self.active_view()?.back();
        Ok(())
    }

    fn forward(&mut self) -> Result<(), TabError> {
        self.active_view()?.forward();
        Ok(())
    }

    fn reload(&mut self) -> Result<(), TabError> {
        self.active_view()?.reload();
        Ok(())
    }

    /// Records the URL a view reported. The only writer of `current_url`.
    fn apply_url_change(&mut self, tab_id: &str, url: &str) -> Result<(), TabError> {
        let idx = self.find(tab_id)?;
        self.entries[idx].tab.current_url = url.to_string();
        self.notify_changed();
        Ok(())
    }

    /// Updates the label from a page title. Pinned tabs keep "Pinned" and
    /// remember the title for when they are unpinned.
    fn apply_title_change(&mut self, tab_id: &str, title: &str) -> Result<(), TabError> {
        let idx = self.find(tab_id)?;
        let tab = &mut self.entries[idx].tab;
        if title.is_empty() {
            return Ok(());
        }
        if tab.pinned {
            tab.unpinned_label = Some(title.to_string());
        } else {
            tab.label = title.to_string();
        }
        self.notify_changed();
        Ok(())
    }

    fn set_loading(&mut self, tab_id: &str, loading: bool) -> Result<(), TabError> {
        let idx = self.find(tab_id)?;
        self.entries[idx].tab.loading = loading;
        Ok(())
    }

    fn run_script_in_active(&mut self, script: &str) -> Result<(), TabError> {
        self.active_view()?.run_script(script);
        Ok(())
    }

    fn get_tab(&self, tab_id: &str) -> Option<&Tab> {
        self.entries.iter().map(|e| &e.tab).find(|t| t.id == tab_id)
    }

    fn get_all_tabs(&self) -> Vec<&Tab> {
        self.entries.iter().map(|e| &e.tab).collect()
    }

    fn get_active_tab(&self) -> Option<&Tab> {
        self.active.map(|idx| &self.entries[idx].tab)
    }

    fn active_index(&self) -> Option<usize> {
        self.active
    }

    fn tab_count(&self) -> usize {
        self.entries.len()
    }
}
