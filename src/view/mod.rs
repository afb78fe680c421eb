//! Boundary to the embedded browser engine.
//!
//! The engine supplies one [`BrowserView`] per tab through a [`ViewFactory`],
//! which is also where each view's request filter is attached. Views report
//! their load lifecycle back as [`ViewEvent`]s over a channel; the coordinator
//! drains that channel on the UI thread.

use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::services::request_filter::RequestFilter;

pub use crate::types::events::{ViewEvent, ViewEventKind};

pub mod headless;
pub mod nav_stack;

/// Channel end handed to engine-facing code.
pub type ViewEventSender = Sender<ViewEvent>;

/// Navigation and script commands accepted by one engine view.
pub trait BrowserView: Send {
    fn load(&mut self, url: &str);
    fn back(&mut self);
    fn forward(&mut self);
    fn reload(&mut self);
    /// The last target this view was sent to, even when the filter refused
    /// it. Empty before the first load.
    fn current_url(&self) -> String;
    /// Fire-and-forget script injection. Failures are not reported.
    fn run_script(&mut self, script: &str);
}

/// Creates views. `filter` must be consulted for every request the view makes.
pub trait ViewFactory: Send {
    fn create_view(&mut self, tab_id: &str, filter: Arc<dyn RequestFilter>) -> Box<dyn BrowserView>;
}
