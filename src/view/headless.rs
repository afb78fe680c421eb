//! In-process engine stand-in.
//!
//! Models just enough of an engine for the console shell and the tests: a
//! back/forward stack, the filter check on every load, and lifecycle events in
//! the order a real engine sends them. Everything a view was asked to do is
//! recorded in a shared [`HeadlessRecorder`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::nav_stack::NavStack;
use super::{BrowserView, ViewEvent, ViewEventKind, ViewEventSender, ViewFactory};
use crate::services::request_filter::RequestFilter;

/// What one headless view was asked to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewRecord {
    pub loads: Vec<String>,
    pub blocked: Vec<String>,
    pub scripts: Vec<String>,
}

/// Shared read access to every headless view's record, keyed by tab id.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRecorder {
    records: Arc<Mutex<HashMap<String, ViewRecord>>>,
}

impl HeadlessRecorder {
    pub fn record(&self, tab_id: &str) -> ViewRecord {
        self.records
            .lock()
            .map(|r| r.get(tab_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn view_count(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn update(&self, tab_id: &str, f: impl FnOnce(&mut ViewRecord)) {
        if let Ok(mut records) = self.records.lock() {
            f(records.entry(tab_id.to_string()).or_default());
        }
    }
}

/// A view with no rendering.
pub struct HeadlessView {
    tab_id: String,
    filter: Arc<dyn RequestFilter>,
    events: ViewEventSender,
    recorder: HeadlessRecorder,
    nav: NavStack,
    /// Last target this view was sent to, committed or not.
    requested: String,
}

impl HeadlessView {
    fn emit(&self, kind: ViewEventKind) {
        // The receiver going away just means the shell is shutting down.
        let _ = self.events.send(ViewEvent::new(self.tab_id.clone(), kind));
    }

    /// Runs one navigation through the filter. Returns whether it committed;
    /// committing into the stacks is left to the caller.
    fn navigate(&mut self, url: &str) -> bool {
        self.requested = url.to_string();
        self.emit(ViewEventKind::LoadStarted);
        if self.filter.decide(url).is_blocked() {
            self.recorder.update(&self.tab_id, |r| r.blocked.push(url.to_string()));
            self.emit(ViewEventKind::LoadFinished { ok: false });
            return false;
        }
        self.recorder.update(&self.tab_id, |r| r.loads.push(url.to_string()));
        self.emit(ViewEventKind::UrlChanged(url.to_string()));
        self.emit(ViewEventKind::LoadFinished { ok: true });
        true
    }
}

impl BrowserView for HeadlessView {
    fn load(&mut self, url: &str) {
        if self.navigate(url) {
            self.nav.commit(url);
        }
    }

    fn back(&mut self) {
        if let Some(url) = self.nav.back_target().map(str::to_string) {
            if self.navigate(&url) {
                self.nav.go_back();
            }
        }
    }

    fn forward(&mut self) {
        if let Some(url) = self.nav.forward_target().map(str::to_string) {
            if self.navigate(&url) {
                self.nav.go_forward();
            }
        }
    }

    fn reload(&mut self) {
        let url = self.nav.current().to_string();
        if !url.is_empty() {
            self.navigate(&url);
        }
    }

    /// The last requested target, so a tab whose load was blocked still
    /// reports where it was sent.
    fn current_url(&self) -> String {
        self.requested.clone()
    }

    fn run_script(&mut self, script: &str) {
        self.recorder.update(&self.tab_id, |r| r.scripts.push(script.to_string()));
    }
}

/// Creates [`HeadlessView`]s that all report into one channel.
pub struct HeadlessViewFactory {
    events: ViewEventSender,
    recorder: HeadlessRecorder,
}

impl HeadlessViewFactory {
    pub fn new(events: ViewEventSender) -> Self {
        Self {
            events,
            recorder: HeadlessRecorder::default(),
        }
    }

    /// A handle that stays valid after the factory is moved into the registry.
    pub fn recorder(&self) -> HeadlessRecorder {
        self.recorder.clone()
    }
}

impl ViewFactory for HeadlessViewFactory {
    fn create_view(&mut self, tab_id: &str, filter: Arc<dyn RequestFilter>) -> Box<dyn BrowserView> {
        self.recorder.update(tab_id, |_| {});
        Box::new(HeadlessView {
            tab_id: tab_id.to_string(),
            filter,
            events: self.events.clone(),
            recorder: self.recorder.clone(),
            nav: NavStack::default(),
            requested: String::new(),
        })
    }
}
