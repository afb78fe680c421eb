//! Coordinator tests against the headless engine, an in-memory database and
//! temp-dir settings and session files.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use crossbeam_channel::{unbounded, Sender};
use tempfile::TempDir;
use valbrowser::app::App;
use valbrowser::database::Database;
use valbrowser::managers::session_manager::{SessionManager, SESSION_FILE_NAME};
use valbrowser::managers::tab_manager::TabManagerTrait;
use valbrowser::services::dark_mode_scheduler::FixedClock;
use valbrowser::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use valbrowser::services::update_manager::UpdateManagerTrait;
use valbrowser::types::download::DownloadStatus;
use valbrowser::types::errors::UpdateError;
use valbrowser::types::events::{Notice, NoticeLevel, ShellEvent, ViewEvent, ViewEventKind};
use valbrowser::types::session::SessionExitPolicy;
use valbrowser::types::settings::{ThemeMode, DEFAULT_HOME_URL};
use valbrowser::types::update::{ReleaseChannel, UpdateStatus};
use valbrowser::view::headless::{HeadlessRecorder, HeadlessViewFactory};

/// Update checker with a canned answer. `None` fails like a dead network.
struct StubUpdates(Option<UpdateStatus>);

impl UpdateManagerTrait for StubUpdates {
    fn check_for_updates(&self, _channel: ReleaseChannel) -> Result<UpdateStatus, UpdateError> {
        self.0
            .clone()
            .ok_or_else(|| UpdateError::NetworkError("offline".into()))
    }

    fn get_current_version(&self) -> &str {
        "1.0.0"
    }

    fn version_info(&self, channel: ReleaseChannel) -> String {
        format!("stub v1.0.0, {} channel.", channel)
    }
}

struct Harness {
    app: App,
    recorder: HeadlessRecorder,
    /// Injects engine reports as if a view had sent them.
    engine: Sender<ViewEvent>,
}

fn harness(dir: &TempDir) -> Harness {
    let (tx, rx) = unbounded();
    let factory = HeadlessViewFactory::new(tx.clone());
    let recorder = factory.recorder();
    let mut settings = SettingsEngine::new(Some(dir.path().join("settings.json")));
    settings.load().unwrap();
    let mut app = App::with_parts(
        settings,
        Arc::new(Database::open_in_memory().unwrap()),
        Box::new(factory),
        SessionManager::new(Some(dir.path().join(SESSION_FILE_NAME))),
        rx,
    )
    .unwrap();
    app.set_update_manager(Box::new(StubUpdates(Some(UpdateStatus::UpToDate))));
    Harness {
        app,
        recorder,
        engine: tx,
    }
}

fn started(dir: &TempDir) -> Harness {
    let mut h = harness(dir);
    h.app.startup();
    h.app.pump_view_events();
    h.app.drain_shell_events();
    h
}

fn notices(app: &App) -> Vec<Notice> {
    app.drain_shell_events()
        .into_iter()
        .filter_map(|e| match e {
            ShellEvent::Notice(n) => Some(n),
            _ => None,
        })
        .collect()
}

fn active_id(app: &App) -> String {
    app.tab_manager.get_active_tab().unwrap().id.clone()
}

// ─── Startup and session ───

#[test]
fn test_startup_without_session_opens_home() {
    let dir = TempDir::new().unwrap();
    let h = started(&dir);
    assert_eq!(h.app.tab_manager.tab_count(), 1);
    assert_eq!(h.app.active_url().as_deref(), Some(DEFAULT_HOME_URL));
    assert_eq!(h.app.status(), "Ready");
    assert_eq!(h.recorder.view_count(), 1);
}

#[test]
fn test_session_roundtrip_restores_order_and_active_tab() {
    let dir = TempDir::new().unwrap();
    {
        let mut h = started(&dir);
        h.app.navigate_active("https://a.example").unwrap();
        h.app.open_tab(Some("https://b.example"));
        h.app.open_tab(Some("https://c.example"));
        let b = h.app.tab_manager.get_all_tabs()[1].id.clone();
        h.app.switch_tab(&b).unwrap();
        h.app.shutdown(true).unwrap();
    }

    let h = started(&dir);
    assert_eq!(
        h.app.tab_manager.current_urls(),
        vec!["https://a.example", "https://b.example", "https://c.example"]
    );
    assert_eq!(h.app.tab_manager.active_index(), Some(1));
}

#[test]
fn test_shutdown_without_save_leaves_no_session() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    h.app.open_tab(Some("https://b.example"));
    h.app.shutdown(false).unwrap();
    assert!(!dir.path().join(SESSION_FILE_NAME).exists());
}

#[test]
fn test_malformed_session_falls_back_to_home() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(SESSION_FILE_NAME), "{\"tabs\": [1, 2").unwrap();
    let h = started(&dir);
    assert_eq!(h.app.tab_manager.tab_count(), 1);
    assert_eq!(h.app.active_url().as_deref(), Some(DEFAULT_HOME_URL));
}

#[test]
fn test_out_of_range_active_index_is_clamped() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(SESSION_FILE_NAME),
        r#"{"tabs": ["https://a.example", "https://b.example"], "current_tab": 9}"#,
    )
    .unwrap();
    let h = started(&dir);
    assert_eq!(h.app.tab_manager.active_index(), Some(1));
}

#[test]
fn test_restore_disabled_ignores_session() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(SESSION_FILE_NAME),
        r#"{"tabs": ["https://a.example"], "current_tab": 0}"#,
    )
    .unwrap();
    let mut h = harness(&dir);
    h.app
        .settings_engine
        .set_value("general.restore_session", serde_json::json!(false))
        .unwrap();
    h.app.startup();
    assert_eq!(h.app.active_url().as_deref(), Some(DEFAULT_HOME_URL));
}

#[test]
fn test_default_exit_policy_asks() {
    let dir = TempDir::new().unwrap();
    let h = harness(&dir);
    assert_eq!(h.app.exit_policy(), SessionExitPolicy::Ask);
}

// ─── Tabs ───

#[test]
fn test_closing_last_tab_opens_home() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    let first = active_id(&h.app);
    h.app.close_tab(&first).unwrap();
    assert_eq!(h.app.tab_manager.tab_count(), 1);
    assert_ne!(active_id(&h.app), first);
    assert_eq!(h.app.active_url().as_deref(), Some(DEFAULT_HOME_URL));
}

#[test]
fn test_switch_tab_syncs_url_bar() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    let home = active_id(&h.app);
    h.app.open_tab(Some("https://b.example"));
    h.app.drain_shell_events();

    h.app.switch_tab(&home).unwrap();
    let events = h.app.drain_shell_events();
    assert!(events.contains(&ShellEvent::UrlBarText(DEFAULT_HOME_URL.to_string())));
    assert!(events.contains(&ShellEvent::TabsChanged));
}

// ─── Navigation and history ───

#[test]
fn test_navigation_records_history_unless_private() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    h.app.navigate_active("a.example").unwrap();

    assert!(h.app.toggle_private_browsing());
    h.app.navigate_active("secret.example").unwrap();
    assert!(!h.app.toggle_private_browsing());

    h.app.navigate_active("c.example").unwrap();
    assert_eq!(
        h.app.history_text().unwrap(),
        "https://a.example\nhttps://c.example"
    );
    // The private navigation still happened
    let record = h.recorder.record(&active_id(&h.app));
    assert!(record.loads.contains(&"https://secret.example".to_string()));
}

#[test]
fn test_private_browsing_notices() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    h.app.toggle_private_browsing();
    h.app.toggle_private_browsing();
    let titles: Vec<String> = notices(&h.app).into_iter().map(|n| n.title).collect();
    assert_eq!(titles, vec!["Private Browsing", "Private Browsing"]);
    assert!(!h.app.is_private_browsing());
}

#[test]
fn test_go_home_loads_home_in_active_tab() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    h.app.navigate_active("a.example").unwrap();
    h.app.go_home().unwrap();
    assert_eq!(h.app.active_url().as_deref(), Some(DEFAULT_HOME_URL));
}

#[test]
fn test_back_and_forward() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    h.app.navigate_active("a.example").unwrap();
    h.app.back().unwrap();
    assert_eq!(h.app.active_url().as_deref(), Some(DEFAULT_HOME_URL));
    h.app.forward().unwrap();
    assert_eq!(h.app.active_url().as_deref(), Some("https://a.example"));
}

// ─── Bookmarks and sidebar ───

#[test]
fn test_empty_texts_and_sidebar() {
    let dir = TempDir::new().unwrap();
    let h = started(&dir);
    assert_eq!(h.app.bookmarks_text().unwrap(), "No bookmarks available.");
    assert_eq!(h.app.history_text().unwrap(), "No browsing history.");
    assert_eq!(h.app.sidebar().unwrap(), vec!["Bookmarks:", "History:"]);
}

#[test]
fn test_bookmark_is_added_once() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    h.app.navigate_active("a.example").unwrap();
    h.app.drain_shell_events();

    assert!(h.app.add_bookmark().unwrap());
    let first = notices(&h.app);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].title, "Bookmark Added");
    assert!(first[0].message.contains("https://a.example"));

    assert!(!h.app.add_bookmark().unwrap());
    assert!(notices(&h.app).is_empty());
    assert_eq!(h.app.bookmarks_text().unwrap(), "https://a.example");
}

#[test]
fn test_sidebar_lists_bookmarks_then_history() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    h.app.navigate_active("a.example").unwrap();
    h.app.add_bookmark().unwrap();
    h.app.navigate_active("b.example").unwrap();
    assert_eq!(
        h.app.sidebar().unwrap(),
        vec![
            "Bookmarks:",
            "https://a.example",
            "History:",
            "https://a.example",
            "https://b.example",
        ]
    );
}

// ─── Engine reports ───

#[test]
fn test_load_finished_without_start_is_dropped() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    let id = active_id(&h.app);

    h.engine
        .send(ViewEvent::new(&id, ViewEventKind::UrlChanged("https://x.example".into())))
        .unwrap();
    h.engine
        .send(ViewEvent::new(&id, ViewEventKind::LoadFinished { ok: true }))
        .unwrap();
    assert_eq!(h.app.pump_view_events(), 2);
    assert_eq!(h.app.status(), "https://x.example");

    h.engine.send(ViewEvent::new(&id, ViewEventKind::LoadStarted)).unwrap();
    h.app.pump_view_events();
    assert_eq!(h.app.status(), "Loading...");
    assert!(h.app.tab_manager.get_tab(&id).unwrap().loading);

    h.engine
        .send(ViewEvent::new(&id, ViewEventKind::LoadFinished { ok: true }))
        .unwrap();
    h.app.pump_view_events();
    assert_eq!(h.app.status(), "Ready");
    assert!(!h.app.tab_manager.get_tab(&id).unwrap().loading);
}

#[test]
fn test_background_tab_reports_leave_status_alone() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    let background = active_id(&h.app);
    h.app.open_tab(Some("https://b.example"));
    h.app.pump_view_events();
    h.app.drain_shell_events();

    h.engine
        .send(ViewEvent::new(&background, ViewEventKind::LoadStarted))
        .unwrap();
    h.engine
        .send(ViewEvent::new(
            &background,
            ViewEventKind::TitleChanged("Background".into()),
        ))
        .unwrap();
    h.app.pump_view_events();

    assert_eq!(h.app.status(), "Ready");
    let tab = h.app.tab_manager.get_tab(&background).unwrap();
    assert!(tab.loading);
    assert_eq!(tab.label, "Background");
    assert!(!h
        .app
        .drain_shell_events()
        .iter()
        .any(|e| matches!(e, ShellEvent::StatusMessage(_) | ShellEvent::UrlBarText(_))));
}

#[test]
fn test_reports_for_closed_tabs_are_dropped() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    let gone = h.app.open_tab(Some("https://b.example"));
    h.app.close_tab(&gone).unwrap();
    h.app.pump_view_events();
    assert_eq!(h.app.tab_manager.tab_count(), 1);
    assert!(h.app.tab_manager.get_tab(&gone).is_none());
}

#[test]
fn test_blocked_popup_never_changes_url() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    let id = h.app.open_tab(Some("https://ads.example/popup"));
    h.app.pump_view_events();
    assert_eq!(h.recorder.record(&id).blocked, vec!["https://ads.example/popup"]);
    assert_eq!(h.app.status(), "Ready");
    // The tab keeps its target even though nothing committed
    assert_eq!(h.app.active_url().as_deref(), Some("https://ads.example/popup"));
    assert_eq!(h.app.tab_manager.get_tab(&id).unwrap().current_url, "");
}

#[test]
fn test_session_keeps_target_of_blocked_tab() {
    let dir = TempDir::new().unwrap();
    {
        let mut h = started(&dir);
        h.app.open_tab(Some("https://example.com/popup-help"));
        h.app.pump_view_events();
        assert_eq!(
            h.app.session_data().tabs,
            vec![DEFAULT_HOME_URL, "https://example.com/popup-help"]
        );
        h.app.shutdown(true).unwrap();
    }

    let h = started(&dir);
    assert_eq!(h.app.tab_manager.tab_count(), 2);
    assert_eq!(
        h.app.tab_manager.current_urls(),
        vec![DEFAULT_HOME_URL, "https://example.com/popup-help"]
    );
    let blocked = h.app.tab_manager.get_all_tabs()[1].id.clone();
    assert_eq!(h.recorder.record(&blocked).blocked, vec!["https://example.com/popup-help"]);
}

#[test]
fn test_download_reports_update_the_list() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    let id = active_id(&h.app);
    let url = "https://files.example/a.zip".to_string();
    for kind in [
        ViewEventKind::DownloadStarted {
            url: url.clone(),
            path: "/tmp/a.zip".into(),
        },
        ViewEventKind::DownloadProgress {
            url: url.clone(),
            percent: 50,
        },
        ViewEventKind::DownloadFinished {
            url: url.clone(),
            success: true,
        },
    ] {
        h.engine.send(ViewEvent::new(&id, kind)).unwrap();
    }
    h.app.pump_view_events();

    let downloads = h.app.downloads();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].status, DownloadStatus::Completed);
    assert!(h
        .app
        .drain_shell_events()
        .contains(&ShellEvent::DownloadsChanged));

    assert_eq!(h.app.clear_finished_downloads().unwrap(), 1);
    assert!(h.app.downloads().is_empty());
}

#[test]
fn test_stray_download_report_is_ignored() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    h.engine
        .send(ViewEvent::new(
            "any",
            ViewEventKind::DownloadProgress {
                url: "https://nowhere.example".into(),
                percent: 10,
            },
        ))
        .unwrap();
    assert_eq!(h.app.pump_view_events(), 1);
    assert!(h.app.downloads().is_empty());
}

// ─── Preferences ───

#[test]
fn test_set_homepage_applies_to_new_tabs_and_persists() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    assert!(h.app.set_homepage(" https://start.example "));
    let n = notices(&h.app);
    assert_eq!(n[0].title, "Homepage Set");
    assert_eq!(n[0].message, "Your homepage has been set to https://start.example.");

    h.app.open_tab(None);
    assert_eq!(h.app.active_url().as_deref(), Some("https://start.example"));
    assert_eq!(h.app.home_url(), "https://start.example");

    let mut reloaded = SettingsEngine::new(Some(dir.path().join("settings.json")));
    assert_eq!(reloaded.load().unwrap().general.homepage, "https://start.example");
}

#[test]
fn test_blank_homepage_is_ignored() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    assert!(!h.app.set_homepage("   "));
    assert!(notices(&h.app).is_empty());
    assert_eq!(h.app.home_url(), DEFAULT_HOME_URL);
}

#[test]
fn test_set_channel() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    h.app.set_channel(ReleaseChannel::Beta);
    assert_eq!(h.app.channel(), ReleaseChannel::Beta);
    let n = notices(&h.app);
    assert_eq!(n[0].title, "Channel Set");
    assert_eq!(n[0].message, "The channel has been set to beta.");
    assert_eq!(h.app.version_info(), "stub v1.0.0, beta channel.");
    assert_eq!(
        h.app.settings_engine.get_settings().general.channel,
        ReleaseChannel::Beta
    );
}

#[test]
fn test_update_check_outcomes() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);

    let up_to_date = h.app.check_for_updates();
    assert_eq!(up_to_date.title, "Up-to-date");
    assert_eq!(up_to_date.level, NoticeLevel::Info);

    h.app.set_update_manager(Box::new(StubUpdates(Some(
        UpdateStatus::UpdateAvailable("v2.0".into()),
    ))));
    let available = h.app.check_for_updates();
    assert_eq!(available.title, "Update Available");
    assert!(available.message.contains("v2.0"));

    h.app.set_update_manager(Box::new(StubUpdates(None)));
    let failed = h.app.check_for_updates();
    assert_eq!(failed.title, "Error");
    assert_eq!(failed.level, NoticeLevel::Warning);

    assert_eq!(notices(&h.app).len(), 3);
}

// ─── Theme ───

#[test]
fn test_set_theme_persists_and_restyles_page() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    h.app.set_theme(ThemeMode::Dark);
    assert_eq!(h.app.theme(), ThemeMode::Dark);
    assert_eq!(
        h.app.settings_engine.get_settings().appearance.theme,
        ThemeMode::Dark
    );
    assert!(h.app.drain_shell_events().iter().any(|e| matches!(
        e,
        ShellEvent::ThemeApplied {
            mode: ThemeMode::Dark,
            ..
        }
    )));
    assert!(!h.recorder.record(&active_id(&h.app)).scripts.is_empty());
}

#[test]
fn test_scheduler_tick_applies_but_does_not_persist() {
    let dir = TempDir::new().unwrap();
    let mut h = started(&dir);
    h.app.set_theme(ThemeMode::Dark);

    let morning = FixedClock(NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    assert_eq!(h.app.tick_scheduler(Duration::from_secs(30), &morning), None);
    assert_eq!(
        h.app.tick_scheduler(Duration::from_secs(30), &morning),
        Some(ThemeMode::Light)
    );
    assert_eq!(h.app.theme(), ThemeMode::Light);
    assert_eq!(
        h.app.settings_engine.get_settings().appearance.theme,
        ThemeMode::Dark
    );
}
