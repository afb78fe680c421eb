//! WebView-based browser window using `wry` + `tao`.
//!
//! Architecture:
//! - One content WebView shows whichever tab is active. Each tab's
//!   [`BrowserView`] is a [`WryTabView`] proxy that forwards commands to the
//!   event loop; commands for tabs that are not on screen only update the
//!   tab's remembered URL, which is loaded when the tab is switched to.
//! - Back and forward walk per-tab stacks kept here and load the target,
//!   since the WebView's own history is shared by every tab.
//! - `with_initialization_script` injects the toolbar, tab strip, sidebar
//!   and status bar into every page.
//! - IPC from JS → Rust via `window.ipc.postMessage()` with a `cmd` field.
//! - WebView load, title and download callbacks become [`ViewEvent`]s on the
//!   same channel the headless engine uses.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Context;
use crossbeam_channel::{unbounded, Sender};
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use tao::window::WindowBuilder;
use wry::{PageLoadEvent, WebViewBuilder};

use crate::app::App;
use crate::managers::tab_manager::TabManagerTrait;
use crate::services::dark_mode_scheduler::SystemClock;
use crate::services::request_filter::RequestFilter;
use crate::services::settings_engine::SettingsEngine;
use crate::services::theme_engine::ThemeEngineTrait;
use crate::types::events::{Notice, NoticeLevel, ShellEvent, ViewEvent, ViewEventKind};
use crate::types::session::SessionExitPolicy;
use crate::types::settings::ThemeMode;
use crate::types::update::ReleaseChannel;
use crate::view::nav_stack::NavStack;
use crate::view::{BrowserView, ViewFactory};

const CHROME_JS: &str = include_str!("../../resources/ui/chrome.js");
const CHROME_CSS: &str = include_str!("../../resources/ui/chrome.css");

#[derive(Debug)]
enum UserEvent {
    Load { tab_id: String, url: String },
    Script { tab_id: String, script: String },
    Back(String),
    Forward(String),
    Reload(String),
    /// State changed; pump engine reports and redraw the chrome.
    Refresh,
}

/// Which tab is on screen, plus per-tab filters, URLs and histories. Shared
/// by the tab proxies, the WebView callbacks and the event loop.
#[derive(Default)]
struct Routing {
    shown_tab: Option<String>,
    filters: HashMap<String, Arc<dyn RequestFilter>>,
    /// Last target each tab was sent to, committed or not.
    urls: HashMap<String, String>,
    histories: HashMap<String, NavStack>,
    /// Tabs with a page load in flight.
    loading: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Back,
    Forward,
}

#[derive(Debug, PartialEq)]
enum StepOutcome {
    Load(String),
    Blocked,
    /// Nothing to go back or forward to.
    Stay,
}

impl Routing {
    fn shown_filter(&self) -> Option<Arc<dyn RequestFilter>> {
        let tab = self.shown_tab.as_ref()?;
        self.filters.get(tab).cloned()
    }

    /// Puts `tab` on screen. Returns the page to load when it changed: the
    /// tab's committed page, or its last target when nothing committed yet.
    fn show(&mut self, tab: Option<String>) -> Option<String> {
        if self.shown_tab == tab {
            return None;
        }
        // The previous tab's in-flight load is abandoned by the switch
        if let Some(old) = self.shown_tab.take() {
            self.loading.remove(&old);
        }
        self.shown_tab = tab.clone();
        let tab = tab?;
        self.histories
            .get(&tab)
            .map(NavStack::current)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .or_else(|| self.urls.get(&tab).cloned())
    }

    fn page_started(&mut self) {
        if let Some(tab) = self.shown_tab.clone() {
            self.loading.insert(tab);
        }
    }

    fn page_finished(&mut self, url: &str) {
        let Some(tab) = self.shown_tab.clone() else { return };
        self.loading.remove(&tab);
        self.urls.insert(tab.clone(), url.to_string());
        self.histories.entry(tab).or_default().commit(url);
    }

    /// Whether a blocked navigation on the shown tab gets its own started and
    /// failed pair. A load already in flight keeps its pending finish instead.
    fn reports_block(&self) -> bool {
        self.shown_tab
            .as_ref()
            .is_some_and(|tab| !self.loading.contains(tab))
    }

    /// Resolves a back or forward request against the tab's own stack. The
    /// stack only moves when the filter lets the target through.
    fn step(&mut self, tab_id: &str, step: Step) -> StepOutcome {
        let Some(nav) = self.histories.get_mut(tab_id) else {
            return StepOutcome::Stay;
        };
        let target = match step {
            Step::Back => nav.back_target(),
            Step::Forward => nav.forward_target(),
        };
        let Some(target) = target.map(str::to_string) else {
            return StepOutcome::Stay;
        };
        self.urls.insert(tab_id.to_string(), target.clone());
        if self
            .filters
            .get(tab_id)
            .is_some_and(|f| f.decide(&target).is_blocked())
        {
            return StepOutcome::Blocked;
        }
        match step {
            Step::Back => nav.go_back(),
            Step::Forward => nav.go_forward(),
        };
        StepOutcome::Load(target)
    }

    fn forget(&mut self, tab_id: &str) {
        self.filters.remove(tab_id);
        self.urls.remove(tab_id);
        self.histories.remove(tab_id);
        self.loading.remove(tab_id);
        if self.shown_tab.as_deref() == Some(tab_id) {
            self.shown_tab = None;
        }
    }
}

type SharedRouting = Arc<Mutex<Routing>>;

fn shown_tab(routing: &SharedRouting) -> Option<String> {
    routing.lock().ok().and_then(|r| r.shown_tab.clone())
}

/// A tab's handle on the shared content WebView.
struct WryTabView {
    tab_id: String,
    proxy: EventLoopProxy<UserEvent>,
    routing: SharedRouting,
}

impl WryTabView {
    fn send(&self, event: UserEvent) {
        // Fails only once the event loop is gone
        let _ = self.proxy.send_event(event);
    }
}

impl BrowserView for WryTabView {
    fn load(&mut self, url: &str) {
        if let Ok(mut r) = self.routing.lock() {
            r.urls.insert(self.tab_id.clone(), url.to_string());
        }
        self.send(UserEvent::Load {
            tab_id: self.tab_id.clone(),
            url: url.to_string(),
        });
    }

    fn back(&mut self) {
        self.send(UserEvent::Back(self.tab_id.clone()));
    }

    fn forward(&mut self) {
        self.send(UserEvent::Forward(self.tab_id.clone()));
    }

    fn reload(&mut self) {
        self.send(UserEvent::Reload(self.tab_id.clone()));
    }

    fn current_url(&self) -> String {
        self.routing
            .lock()
            .ok()
            .and_then(|r| r.urls.get(&self.tab_id).cloned())
            .unwrap_or_default()
    }

    fn run_script(&mut self, script: &str) {
        self.send(UserEvent::Script {
            tab_id: self.tab_id.clone(),
            script: script.to_string(),
        });
    }
}

impl Drop for WryTabView {
    fn drop(&mut self) {
        if let Ok(mut r) = self.routing.lock() {
            r.forget(&self.tab_id);
        }
    }
}

struct WryViewFactory {
    proxy: EventLoopProxy<UserEvent>,
    routing: SharedRouting,
}

impl ViewFactory for WryViewFactory {
    fn create_view(&mut self, tab_id: &str, filter: Arc<dyn RequestFilter>) -> Box<dyn BrowserView> {
        if let Ok(mut r) = self.routing.lock() {
            r.filters.insert(tab_id.to_string(), filter);
        }
        Box::new(WryTabView {
            tab_id: tab_id.to_string(),
            proxy: self.proxy.clone(),
            routing: self.routing.clone(),
        })
    }
}

struct BrowserState {
    app: App,
    /// Notices waiting to be shown once the state lock is released.
    pending_notices: Vec<Notice>,
}

// ─── IPC handler ───

fn handle_ipc(state: &mut BrowserState, message: &str) {
    let msg: serde_json::Value = match serde_json::from_str(message) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("malformed IPC message: {}", e);
            return;
        }
    };
    let Some(cmd) = msg.get("cmd").and_then(|v| v.as_str()) else {
        return;
    };
    let str_arg = |name: &str| msg.get(name).and_then(|v| v.as_str()).unwrap_or("");
    let app = &mut state.app;

    let result = match cmd {
        "ui_ready" => Ok(()),
        "navigate" => app.navigate_active(str_arg("url")).map(|_| ()),
        "back" => app.back(),
        "forward" => app.forward(),
        "reload" => app.reload(),
        "home" => app.go_home(),
        "new_tab" => {
            app.open_tab(None);
            Ok(())
        }
        "close_tab" => app.close_tab(str_arg("id")),
        "switch_tab" => app.switch_tab(str_arg("id")),
        "toggle_pin" => app.toggle_pin(str_arg("id")).map(|_| ()),
        "reorder_tab" => {
            let index = msg.get("index").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
            app.reorder_tab(str_arg("id"), index)
        }
        "add_bookmark" => app.add_bookmark().map(|_| ()),
        "view_bookmarks" => app.bookmarks_text().map(|text| {
            state.pending_notices.push(Notice::info("Bookmarks", text));
        }),
        "view_history" => app.history_text().map(|text| {
            state.pending_notices.push(Notice::info("History", text));
        }),
        "view_downloads" => {
            state.pending_notices.push(Notice::info("Download Manager", downloads_text(app)));
            Ok(())
        }
        "clear_downloads" => app.clear_finished_downloads().map(|_| ()),
        "set_homepage" => {
            app.set_homepage(str_arg("url"));
            Ok(())
        }
        "toggle_private" => {
            app.toggle_private_browsing();
            Ok(())
        }
        "set_theme" => {
            let mode = if str_arg("theme") == "dark" {
                ThemeMode::Dark
            } else {
                ThemeMode::Light
            };
            app.set_theme(mode);
            Ok(())
        }
        "set_channel" => {
            if let Some(channel) = ReleaseChannel::parse(str_arg("channel")) {
                app.set_channel(channel);
            }
            Ok(())
        }
        "check_updates" => {
            app.check_for_updates();
            Ok(())
        }
        "version_info" => {
            app.show_version_info();
            Ok(())
        }
        other => {
            log::debug!("unknown IPC command: {}", other);
            Ok(())
        }
    };

    if let Err(e) = result {
        log::warn!("IPC command {} failed: {}", cmd, e);
    }
}

fn downloads_text(app: &App) -> String {
    let downloads = app.downloads();
    if downloads.is_empty() {
        return "No downloads.".to_string();
    }
    downloads
        .iter()
        .map(|d| format!("{} ({}%) {:?}", d.filename, d.progress, d.status))
        .collect::<Vec<_>>()
        .join("\n")
}

// ─── Chrome state ───

fn build_chrome_update(app: &App) -> String {
    let tabs: Vec<serde_json::Value> = app
        .tab_manager
        .get_all_tabs()
        .iter()
        .map(|t| {
            serde_json::json!({
                "id": t.id,
                "label": t.label,
                "url": t.current_url,
                "pinned": t.pinned,
                "loading": t.loading,
            })
        })
        .collect();
    let active_id = app
        .tab_manager
        .get_active_tab()
        .map(|t| t.id.clone())
        .unwrap_or_default();
    let sidebar = app.sidebar().unwrap_or_else(|e| {
        log::warn!("sidebar unavailable: {}", e);
        Vec::new()
    });

    let update = serde_json::json!({
        "tabs": tabs,
        "activeId": active_id,
        "url": app.active_url().unwrap_or_default(),
        "status": app.status(),
        "sidebar": sidebar,
        "private": app.is_private_browsing(),
        "stylesheet": app.theme_engine.stylesheet(),
    });
    format!("if(window.__val_update)window.__val_update({})", update)
}

/// Pumps engine reports, puts the active tab on screen and redraws the chrome.
fn refresh(state: &Arc<Mutex<BrowserState>>, routing: &SharedRouting, webview: &wry::WebView) {
    let notices = {
        let Ok(mut s) = state.lock() else { return };
        s.app.pump_view_events();

        let active = s.app.tab_manager.get_active_tab().map(|t| t.id.clone());
        let switched_to = routing.lock().ok().and_then(|mut r| r.show(active));
        if let Some(url) = switched_to {
            if let Err(e) = webview.load_url(&url) {
                log::warn!("failed to show {}: {}", url, e);
            }
        }

        for event in s.app.drain_shell_events() {
            if let ShellEvent::Notice(notice) = event {
                s.pending_notices.push(notice);
            }
        }
        let _ = webview.evaluate_script(&build_chrome_update(&s.app));
        std::mem::take(&mut s.pending_notices)
    };

    // Modal dialogs may pump the event loop, so they run without the lock held
    for notice in notices {
        show_notice(&notice);
    }
}

fn show_notice(notice: &Notice) {
    let level = match notice.level {
        NoticeLevel::Info => MessageLevel::Info,
        NoticeLevel::Warning => MessageLevel::Warning,
    };
    MessageDialog::new()
        .set_level(level)
        .set_title(&notice.title)
        .set_description(&notice.message)
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn ask_save_session() -> bool {
    let result = MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title("Save Session")
        .set_description("Do you want to save your session?")
        .set_buttons(MessageButtons::YesNo)
        .show();
    result == MessageDialogResult::Yes
}

fn download_target(url: &str, suggested: &std::path::Path) -> PathBuf {
    let name = suggested
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            url.rsplit('/')
                .next()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "download".to_string());
    dirs::download_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(name)
}

fn send_view_event(tx: &Sender<ViewEvent>, routing: &SharedRouting, kind: ViewEventKind) {
    let tab_id = shown_tab(routing).unwrap_or_default();
    let _ = tx.send(ViewEvent::new(tab_id, kind));
}

/// Reports a navigation the filter refused as a load that failed.
fn send_blocked_pair(tx: &Sender<ViewEvent>, routing: &SharedRouting) {
    send_view_event(tx, routing, ViewEventKind::LoadStarted);
    send_view_event(tx, routing, ViewEventKind::LoadFinished { ok: false });
}

/// Back or forward within one tab's own history.
fn step_tab(
    routing: &SharedRouting,
    tx: &Sender<ViewEvent>,
    webview: &wry::WebView,
    tab_id: &str,
    step: Step,
) {
    let (outcome, reports_block) = match routing.lock() {
        Ok(mut r) if r.shown_tab.as_deref() == Some(tab_id) => {
            (r.step(tab_id, step), r.reports_block())
        }
        // Tabs off screen have nothing loaded to step through
        _ => return,
    };
    match outcome {
        StepOutcome::Load(url) => {
            if let Err(e) = webview.load_url(&url) {
                log::warn!("failed to load {}: {}", url, e);
            }
        }
        StepOutcome::Blocked if reports_block => send_blocked_pair(tx, routing),
        StepOutcome::Blocked | StepOutcome::Stay => {}
    }
}

/// Sleeps until the next schedule check, or indefinitely when that instant
/// cannot be represented.
fn wake_after(now: Instant, wait: Duration) -> ControlFlow {
    now.checked_add(wait)
        .map_or(ControlFlow::Wait, ControlFlow::WaitUntil)
}

// ─── Main entry point ───

pub fn run(settings_engine: SettingsEngine) -> anyhow::Result<()> {
    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();
    let routing: SharedRouting = Arc::new(Mutex::new(Routing::default()));

    let (view_tx, view_rx) = unbounded();
    let factory = WryViewFactory {
        proxy: proxy.clone(),
        routing: routing.clone(),
    };
    let mut app = App::new(settings_engine, Box::new(factory), view_rx)
        .context("failed to initialize Val Browser")?;
    app.startup();

    let state = Arc::new(Mutex::new(BrowserState {
        app,
        pending_notices: Vec::new(),
    }));

    let window = WindowBuilder::new()
        .with_title("Val Browser")
        .with_inner_size(tao::dpi::LogicalSize::new(1024.0, 768.0))
        .build(&event_loop)
        .context("failed to create window")?;

    let init_script = format!(
        "window.__VAL_CHROME_CSS={};\n{}",
        serde_json::to_string(CHROME_CSS)?,
        CHROME_JS
    );

    let ipc_state = state.clone();
    let ipc_proxy = proxy.clone();
    let nav_routing = routing.clone();
    let nav_tx = view_tx.clone();
    let nav_proxy = proxy.clone();
    let load_routing = routing.clone();
    let load_tx = view_tx.clone();
    let load_proxy = proxy.clone();
    let title_routing = routing.clone();
    let title_tx = view_tx.clone();
    let title_proxy = proxy.clone();
    let dl_start_routing = routing.clone();
    let dl_start_tx = view_tx.clone();
    let dl_start_proxy = proxy.clone();
    let dl_done_routing = routing.clone();
    let dl_done_tx = view_tx.clone();
    let step_tx = view_tx;
    let dl_done_proxy = proxy.clone();

    let builder = WebViewBuilder::new()
        .with_initialization_script(&init_script)
        .with_ipc_handler(move |msg: wry::http::Request<String>| {
            if let Ok(mut s) = ipc_state.lock() {
                handle_ipc(&mut s, msg.body());
            }
            let _ = ipc_proxy.send_event(UserEvent::Refresh);
        })
        .with_navigation_handler(move |url| {
            let shown = nav_routing
                .lock()
                .ok()
                .and_then(|r| Some((r.shown_filter()?, r.reports_block())));
            // Nothing is on screen yet while the window is being built
            let Some((filter, reports_block)) = shown else { return true };
            if filter.decide(&url).is_blocked() {
                if reports_block {
                    send_blocked_pair(&nav_tx, &nav_routing);
                    let _ = nav_proxy.send_event(UserEvent::Refresh);
                }
                return false;
            }
            true
        })
        .with_on_page_load_handler(move |event, url| {
            match event {
                PageLoadEvent::Started => {
                    if let Ok(mut r) = load_routing.lock() {
                        r.page_started();
                    }
                    send_view_event(&load_tx, &load_routing, ViewEventKind::LoadStarted);
                }
                PageLoadEvent::Finished => {
                    if let Ok(mut r) = load_routing.lock() {
                        r.page_finished(&url);
                    }
                    send_view_event(&load_tx, &load_routing, ViewEventKind::UrlChanged(url));
                    send_view_event(&load_tx, &load_routing, ViewEventKind::LoadFinished { ok: true });
                }
            }
            let _ = load_proxy.send_event(UserEvent::Refresh);
        })
        .with_document_title_changed_handler(move |title| {
            send_view_event(&title_tx, &title_routing, ViewEventKind::TitleChanged(title));
            let _ = title_proxy.send_event(UserEvent::Refresh);
        })
        .with_download_started_handler(move |url, suggested_path| {
            let target = download_target(&url, suggested_path);
            *suggested_path = target.clone();
            send_view_event(
                &dl_start_tx,
                &dl_start_routing,
                ViewEventKind::DownloadStarted {
                    url,
                    path: target.to_string_lossy().into_owned(),
                },
            );
            let _ = dl_start_proxy.send_event(UserEvent::Refresh);
            true
        })
        .with_download_completed_handler(move |url, _path, success| {
            send_view_event(
                &dl_done_tx,
                &dl_done_routing,
                ViewEventKind::DownloadFinished { url, success },
            );
            let _ = dl_done_proxy.send_event(UserEvent::Refresh);
        })
        .with_new_window_req_handler(move |url, _features| {
            log::debug!("denied new window for {}", url);
            wry::NewWindowResponse::Deny
        })
        .with_devtools(cfg!(debug_assertions));

    #[cfg(target_os = "linux")]
    let webview = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window
            .default_vbox()
            .context("failed to get GTK vbox")?;
        builder.build_gtk(vbox).context("failed to create WebView")?
    };

    #[cfg(not(target_os = "linux"))]
    let webview = builder.build(&window).context("failed to create WebView")?;

    refresh(&state, &routing, &webview);
    let mut last_tick = Instant::now();

    event_loop.run(move |event, _, control_flow| {
        let now = Instant::now();
        let elapsed = now.duration_since(last_tick);
        last_tick = now;

        let (theme_fired, next_check) = match state.lock() {
            Ok(mut s) => (
                s.app.tick_scheduler(elapsed, &SystemClock).is_some(),
                s.app.scheduler.time_until_next_check(),
            ),
            Err(_) => (false, Duration::from_secs(60)),
        };
        *control_flow = wake_after(now, next_check);
        if theme_fired {
            refresh(&state, &routing, &webview);
        }

        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                let policy = state
                    .lock()
                    .map(|s| s.app.exit_policy())
                    .unwrap_or(SessionExitPolicy::Never);
                let save = match policy {
                    SessionExitPolicy::Always => true,
                    SessionExitPolicy::Never => false,
                    SessionExitPolicy::Ask => ask_save_session(),
                };
                if let Ok(mut s) = state.lock() {
                    if let Err(e) = s.app.shutdown(save) {
                        log::error!("failed to save session: {}", e);
                    }
                }
                *control_flow = ControlFlow::Exit;
            }

            Event::UserEvent(user_event) => {
                let on_screen = |tab_id: &str| shown_tab(&routing).as_deref() == Some(tab_id);
                match user_event {
                    UserEvent::Load { tab_id, url } => {
                        if on_screen(&tab_id) {
                            if let Err(e) = webview.load_url(&url) {
                                log::warn!("failed to load {}: {}", url, e);
                            }
                        }
                    }
                    UserEvent::Script { tab_id, script } => {
                        if on_screen(&tab_id) {
                            let _ = webview.evaluate_script(&script);
                        }
                    }
                    UserEvent::Back(tab_id) => {
                        step_tab(&routing, &step_tx, &webview, &tab_id, Step::Back);
                        refresh(&state, &routing, &webview);
                    }
                    UserEvent::Forward(tab_id) => {
                        step_tab(&routing, &step_tx, &webview, &tab_id, Step::Forward);
                        refresh(&state, &routing, &webview);
                    }
                    UserEvent::Reload(tab_id) => {
                        if on_screen(&tab_id) {
                            let _ = webview.reload();
                        }
                    }
                    UserEvent::Refresh => refresh(&state, &routing, &webview),
                }
            }

            _ => {}
        }
    });
}
