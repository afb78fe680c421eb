//! App Core for Val Browser.
//!
//! Central struct holding the tab registry, the persistent stores and the
//! services, and the only place where user actions and engine reports turn
//! into state changes. Everything runs on the UI thread; the engine reaches
//! the app through the view-event channel and the app reaches the shell
//! through [`ShellEvent`]s.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde_json::json;

use crate::database::Database;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::download_manager::{DownloadManager, DownloadManagerTrait};
use crate::managers::history_manager::{HistoryManager, HistoryManagerTrait};
use crate::managers::session_manager::{SessionManager, SessionManagerTrait};
use crate::managers::tab_manager::{TabManager, TabManagerTrait};
use crate::platform;
use crate::services::dark_mode_scheduler::{Clock, DarkModeSchedule, DarkModeScheduler};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::theme_engine::{ThemeEngine, ThemeEngineTrait};
use crate::services::update_manager::{UpdateManager, UpdateManagerTrait};
use crate::types::download::DownloadItem;
use crate::types::errors::{AppError, BookmarkError, TabError};
use crate::types::events::{Notice, ShellEvent, ViewEvent, ViewEventKind};
use crate::types::session::{SessionData, SessionExitPolicy};
use crate::types::settings::ThemeMode;
use crate::types::update::{ReleaseChannel, UpdateStatus};
use crate::view::ViewFactory;

/// File name of the SQLite database inside the data directory.
pub const DATABASE_FILE_NAME: &str = "valbrowser.db";

const STATUS_LOADING: &str = "Loading...";
const STATUS_READY: &str = "Ready";

/// Central application struct holding all managers and services.
pub struct App {
    pub db: Arc<Database>,
    pub tab_manager: TabManager,
    pub bookmark_manager: BookmarkManager,
    pub history_manager: HistoryManager,
    pub download_manager: DownloadManager,
    pub session_manager: SessionManager,
    pub settings_engine: SettingsEngine,
    pub theme_engine: ThemeEngine,
    pub scheduler: DarkModeScheduler,
    update_manager: Box<dyn UpdateManagerTrait>,
    private_browsing: bool,
    channel: ReleaseChannel,
    status: String,
    /// Tabs with a `LoadStarted` not yet matched by `LoadFinished`.
    loading: HashSet<String>,
    view_events: Receiver<ViewEvent>,
    shell_tx: Sender<ShellEvent>,
    shell_rx: Receiver<ShellEvent>,
}

impl App {
    /// Creates an App with its database and session file in the platform
    /// data directory. `settings_engine` should already be loaded.
    pub fn new(
        settings_engine: SettingsEngine,
        factory: Box<dyn ViewFactory>,
        view_events: Receiver<ViewEvent>,
    ) -> Result<Self, AppError> {
        let data_dir = platform::get_data_dir();
        std::fs::create_dir_all(&data_dir)?;
        let db = Arc::new(Database::open(data_dir.join(DATABASE_FILE_NAME))?);

        let session_path = settings_engine
            .get_settings()
            .general
            .session_file
            .as_ref()
            .map(PathBuf::from);
        let session_manager = SessionManager::new(session_path);

        Self::with_parts(settings_engine, db, factory, session_manager, view_events)
    }

    /// Creates an App from explicit parts. Used by tests and by callers that
    /// pick their own storage locations.
    pub fn with_parts(
        settings_engine: SettingsEngine,
        db: Arc<Database>,
        factory: Box<dyn ViewFactory>,
        session_manager: SessionManager,
        view_events: Receiver<ViewEvent>,
    ) -> Result<Self, AppError> {
        let (shell_tx, shell_rx) = unbounded();
        let settings = settings_engine.get_settings().clone();

        let tab_manager = TabManager::new(factory, &settings.general.homepage, shell_tx.clone());
        let bookmark_manager = BookmarkManager::new(db.clone());
        let history_manager = HistoryManager::new(db.clone());
        let download_manager = DownloadManager::new(db.clone())?;

        let schedule_settings = &settings.appearance.dark_mode_schedule;
        let scheduler = DarkModeScheduler::new(
            DarkModeSchedule::from(schedule_settings),
            schedule_settings.enabled,
        );

        Ok(Self {
            db,
            tab_manager,
            bookmark_manager,
            history_manager,
            download_manager,
            session_manager,
            settings_engine,
            theme_engine: ThemeEngine::new(settings.appearance.theme),
            scheduler,
            update_manager: Box::new(UpdateManager::new(&settings.updates.endpoint)),
            private_browsing: false,
            channel: settings.general.channel,
            status: String::new(),
            loading: HashSet::new(),
            view_events,
            shell_tx,
            shell_rx,
        })
    }

    /// Swaps the update checker, e.g. for one that never touches the network.
    pub fn set_update_manager(&mut self, update_manager: Box<dyn UpdateManagerTrait>) {
        self.update_manager = update_manager;
    }

    fn emit(&self, event: ShellEvent) {
        // The receiver lives in `self`, so this cannot fail
        let _ = self.shell_tx.send(event);
    }

    fn notify(&self, notice: Notice) {
        self.emit(ShellEvent::Notice(notice));
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
        self.emit(ShellEvent::StatusMessage(self.status.clone()));
    }

    /// Writes one setting, logging instead of failing the user action.
    fn persist_setting(&mut self, key: &str, value: serde_json::Value) {
        if let Err(e) = self.settings_engine.set_value(key, value) {
            log::warn!("could not persist {}: {}", key, e);
        }
    }

    fn is_active(&self, tab_id: &str) -> bool {
        self.tab_manager
            .get_active_tab()
            .is_some_and(|t| t.id == tab_id)
    }

    /// Pushes the active tab's URL into the URL bar.
    fn sync_url_bar(&self) {
        if let Some(url) = self.active_url() {
            self.emit(ShellEvent::UrlBarText(url));
        }
    }

    // ─── Lifecycle ───

    /// Restores the saved session when enabled and present, otherwise opens
    /// the home page. Applies the configured theme.
    pub fn startup(&mut self) {
        let settings = self.settings_engine.get_settings().clone();

        let restored = settings.general.restore_session && self.restore_session();
        if !restored {
            self.tab_manager.open(None);
        }

        self.apply_theme(settings.appearance.theme);
        self.sync_url_bar();

        if settings.updates.check_on_startup {
            self.check_for_updates();
        }
        log::info!("started with {} tab(s)", self.tab_manager.tab_count());
    }

    /// Reopens the saved tabs in order. Returns false when there was nothing
    /// to restore; an unreadable session file is logged and skipped.
    fn restore_session(&mut self) -> bool {
        let data = match self.session_manager.restore_session() {
            Ok(Some(data)) if !data.tabs.is_empty() => data,
            Ok(_) => return false,
            Err(e) => {
                log::warn!("ignoring saved session: {}", e);
                return false;
            }
        };

        let ids: Vec<String> = data
            .tabs
            .iter()
            .map(|url| self.tab_manager.open(Some(url)))
            .collect();
        let active = data.current_tab.unwrap_or(ids.len() - 1).min(ids.len() - 1);
        if let Err(e) = self.tab_manager.set_active(&ids[active]) {
            log::warn!("could not activate restored tab: {}", e);
        }
        log::info!("restored {} tab(s)", ids.len());
        true
    }

    /// What the exit path should do with the open tabs.
    pub fn exit_policy(&self) -> SessionExitPolicy {
        self.settings_engine.get_settings().general.session_on_exit
    }

    /// Saves the session when `save_session` is set.
    pub fn shutdown(&mut self, save_session: bool) -> Result<(), AppError> {
        if save_session {
            self.session_manager.save_session(&self.session_data())?;
        }
        log::info!("shutting down");
        Ok(())
    }

    /// Open tab URLs in display order and the active index.
    pub fn session_data(&self) -> SessionData {
        SessionData {
            tabs: self.tab_manager.current_urls(),
            current_tab: self.tab_manager.active_index(),
        }
    }

    // ─── Tabs ───

    pub fn open_tab(&mut self, url: Option<&str>) -> String {
        let id = self.tab_manager.open(url);
        self.sync_url_bar();
        id
    }

    /// Closes a tab. Closing the last one opens a fresh home tab.
    pub fn close_tab(&mut self, tab_id: &str) -> Result<(), AppError> {
        self.tab_manager.close(tab_id)?;
        self.loading.remove(tab_id);
        if self.tab_manager.tab_count() == 0 {
            self.tab_manager.open(None);
        }
        self.sync_url_bar();
        Ok(())
    }

    pub fn switch_tab(&mut self, tab_id: &str) -> Result<(), AppError> {
        self.tab_manager.set_active(tab_id)?;
        self.sync_url_bar();
        Ok(())
    }

    pub fn toggle_pin(&mut self, tab_id: &str) -> Result<bool, AppError> {
        Ok(self.tab_manager.toggle_pin(tab_id)?)
    }

    pub fn reorder_tab(&mut self, tab_id: &str, new_index: usize) -> Result<(), AppError> {
        Ok(self.tab_manager.reorder(tab_id, new_index)?)
    }

    // ─── Navigation ───

    /// Loads URL-bar input in the active tab and records it in history
    /// unless private browsing is on. Returns the URL requested.
    pub fn navigate_active(&mut self, raw_input: &str) -> Result<String, AppError> {
        let target = self.tab_manager.navigate_active(raw_input)?;
        if !self.private_browsing {
            self.history_manager.record_visit(&target)?;
        }
        self.emit(ShellEvent::SidebarRefresh);
        Ok(target)
    }

    pub fn go_home(&mut self) -> Result<(), AppError> {
        let home = self.tab_manager.home_url().to_string();
        Ok(self.tab_manager.go_to(&home)?)
    }

    pub fn back(&mut self) -> Result<(), AppError> {
        Ok(self.tab_manager.back()?)
    }

    pub fn forward(&mut self) -> Result<(), AppError> {
        Ok(self.tab_manager.forward()?)
    }

    pub fn reload(&mut self) -> Result<(), AppError> {
        Ok(self.tab_manager.reload()?)
    }

    /// URL the active tab is showing.
    pub fn active_url(&self) -> Option<String> {
        let idx = self.tab_manager.active_index()?;
        self.tab_manager.current_urls().into_iter().nth(idx)
    }

    // ─── Bookmarks and history ───

    /// Bookmarks the active tab's URL. Returns whether a bookmark was added;
    /// an already bookmarked URL is left alone.
    pub fn add_bookmark(&mut self) -> Result<bool, AppError> {
        let url = self.active_url().ok_or(TabError::NoActiveTab)?;
        if url.is_empty() {
            return Ok(false);
        }
        let title = self
            .tab_manager
            .get_active_tab()
            .map(|t| t.label.clone())
            .unwrap_or_default();

        let added = match self.bookmark_manager.add_bookmark(&url, &title) {
            Ok(_) => true,
            Err(BookmarkError::DuplicateUrl(_)) => false,
            Err(e) => return Err(e.into()),
        };
        if added {
            self.notify(Notice::info(
                "Bookmark Added",
                format!("{} has been added to your bookmarks.", url),
            ));
        }
        self.emit(ShellEvent::SidebarRefresh);
        Ok(added)
    }

    pub fn bookmarks_text(&self) -> Result<String, AppError> {
        let bookmarks = self.bookmark_manager.list_bookmarks()?;
        if bookmarks.is_empty() {
            return Ok("No bookmarks available.".to_string());
        }
        Ok(bookmarks
            .iter()
            .map(|b| b.url.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub fn history_text(&self) -> Result<String, AppError> {
        let history = self.history_manager.list_history()?;
        if history.is_empty() {
            return Ok("No browsing history.".to_string());
        }
        Ok(history
            .iter()
            .map(|h| h.url.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Sidebar rows: a bookmarks header, the bookmarks, a history header, the history.
    pub fn sidebar(&self) -> Result<Vec<String>, AppError> {
        let mut rows = vec!["Bookmarks:".to_string()];
        rows.extend(self.bookmark_manager.list_bookmarks()?.into_iter().map(|b| b.url));
        rows.push("History:".to_string());
        rows.extend(self.history_manager.list_history()?.into_iter().map(|h| h.url));
        Ok(rows)
    }

    // ─── Preferences ───

    /// Sets the home target for new tabs and `go_home`. Blank input is ignored.
    pub fn set_homepage(&mut self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() {
            return false;
        }
        self.tab_manager.set_home_url(url);
        self.persist_setting("general.homepage", json!(url));
        self.notify(Notice::info(
            "Homepage Set",
            format!("Your homepage has been set to {}.", url),
        ));
        true
    }

    pub fn home_url(&self) -> &str {
        self.tab_manager.home_url()
    }

    /// Flips private browsing and returns the new state.
    pub fn toggle_private_browsing(&mut self) -> bool {
        self.private_browsing = !self.private_browsing;
        let message = if self.private_browsing {
            "Private browsing mode is now ON. History and cookies will not be saved."
        } else {
            "Private browsing mode is now OFF."
        };
        self.notify(Notice::info("Private Browsing", message));
        self.private_browsing
    }

    pub fn is_private_browsing(&self) -> bool {
        self.private_browsing
    }

    // ─── Theme ───

    /// Applies a theme chosen by the user and remembers it.
    pub fn set_theme(&mut self, mode: ThemeMode) {
        self.apply_theme(mode);
        self.persist_setting("appearance.theme", json!(mode));
    }

    fn apply_theme(&mut self, mode: ThemeMode) {
        let applied = self.theme_engine.set_theme(mode);
        self.emit(ShellEvent::ThemeApplied {
            mode: applied.mode,
            stylesheet: applied.stylesheet,
        });
        // Fire-and-forget; an empty registry just has no page to restyle
        let _ = self.tab_manager.run_script_in_active(applied.page_script);
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme_engine.get_theme()
    }

    /// Advances the dark-mode scheduler and applies its verdict when an
    /// interval has elapsed. Returns the applied mode, if any.
    pub fn tick_scheduler(&mut self, elapsed: Duration, clock: &dyn Clock) -> Option<ThemeMode> {
        let mode = self.scheduler.advance(elapsed, clock)?;
        self.apply_theme(mode);
        Some(mode)
    }

    // ─── Updates ───

    pub fn channel(&self) -> ReleaseChannel {
        self.channel
    }

    pub fn set_channel(&mut self, channel: ReleaseChannel) {
        self.channel = channel;
        self.persist_setting("general.channel", json!(channel));
        self.notify(Notice::info(
            "Channel Set",
            format!("The channel has been set to {}.", channel),
        ));
    }

    /// Runs one update check and reports the outcome as a notice.
    pub fn check_for_updates(&mut self) -> Notice {
        let notice = match self.update_manager.check_for_updates(self.channel) {
            Ok(UpdateStatus::UpdateAvailable(tag)) => Notice::info(
                "Update Available",
                format!("A new version ({}) is available.", tag),
            ),
            Ok(UpdateStatus::UpToDate) => {
                Notice::info("Up-to-date", "You are using the latest version.")
            }
            Err(e) => {
                log::warn!("update check failed: {}", e);
                Notice::warning("Error", "Unable to check for updates at the moment.")
            }
        };
        self.notify(notice.clone());
        notice
    }

    pub fn version_info(&self) -> String {
        self.update_manager.version_info(self.channel)
    }

    pub fn show_version_info(&self) {
        self.notify(Notice::info("Version", self.version_info()));
    }

    // ─── Downloads ───

    pub fn downloads(&self) -> Vec<&DownloadItem> {
        self.download_manager.list_downloads()
    }

    pub fn clear_finished_downloads(&mut self) -> Result<usize, AppError> {
        let removed = self.download_manager.clear_finished()?;
        self.emit(ShellEvent::DownloadsChanged);
        Ok(removed)
    }

    // ─── Engine reports ───

    /// Applies every pending engine report. Returns how many were handled.
    pub fn pump_view_events(&mut self) -> usize {
        let events: Vec<ViewEvent> = self.view_events.try_iter().collect();
        let count = events.len();
        for event in events {
            self.handle_view_event(event);
        }
        count
    }

    fn handle_view_event(&mut self, event: ViewEvent) {
        let ViewEvent { tab_id, kind } = event;

        if let ViewEventKind::DownloadStarted { .. }
        | ViewEventKind::DownloadProgress { .. }
        | ViewEventKind::DownloadFinished { .. } = kind
        {
            self.handle_download_event(kind);
            return;
        }

        if self.tab_manager.get_tab(&tab_id).is_none() {
            log::debug!("dropping {:?} for closed tab {}", kind, tab_id);
            return;
        }
        let active = self.is_active(&tab_id);

        match kind {
            ViewEventKind::LoadStarted => {
                self.loading.insert(tab_id.clone());
                let _ = self.tab_manager.set_loading(&tab_id, true);
                if active {
                    self.set_status(STATUS_LOADING);
                }
            }
            ViewEventKind::LoadFinished { ok } => {
                if !self.loading.remove(&tab_id) {
                    log::debug!("dropping LoadFinished without LoadStarted for {}", tab_id);
                    return;
                }
                let _ = self.tab_manager.set_loading(&tab_id, false);
                if !ok {
                    log::debug!("load failed or was blocked in {}", tab_id);
                }
                if active {
                    self.set_status(STATUS_READY);
                }
            }
            ViewEventKind::UrlChanged(url) => {
                let _ = self.tab_manager.apply_url_change(&tab_id, &url);
                if active {
                    self.set_status(&url);
                    self.emit(ShellEvent::UrlBarText(url));
                }
            }
            ViewEventKind::TitleChanged(title) => {
                let _ = self.tab_manager.apply_title_change(&tab_id, &title);
            }
            _ => {}
        }
    }

    fn handle_download_event(&mut self, kind: ViewEventKind) {
        let result = match kind {
            ViewEventKind::DownloadStarted { url, path } => {
                self.download_manager.register(&url, &path).map(|_| ())
            }
            ViewEventKind::DownloadProgress { url, percent } => {
                self.download_manager.update_progress(&url, percent)
            }
            ViewEventKind::DownloadFinished { url, success } => {
                self.download_manager.finish(&url, success)
            }
            _ => return,
        };
        if let Err(e) = result {
            log::warn!("download report ignored: {}", e);
        }
        self.emit(ShellEvent::DownloadsChanged);
    }

    // ─── Shell ───

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Takes every shell event queued since the last call, oldest first.
    pub fn drain_shell_events(&self) -> Vec<ShellEvent> {
        self.shell_rx.try_iter().collect()
    }
}
