//! Val Browser, a tabbed desktop browser shell around an embedded web engine.
//!
//! Entry point: opens the browser window through `wry`/`tao`.
//! When built without the `gui` feature, runs a console demo against the
//! headless engine.

use anyhow::Context;
use valbrowser::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

/// Loads settings, falling back to defaults when the file is unreadable,
/// then installs logging at the configured level.
fn bootstrap() -> anyhow::Result<SettingsEngine> {
    let mut settings_engine = SettingsEngine::new(None);
    let load_result = settings_engine.load();

    let level = settings_engine.get_settings().logging.level.clone();
    valbrowser::logging::init(&level).context("failed to initialize logging")?;

    if let Err(e) = load_result {
        log::warn!(
            "using default settings, {} is unreadable: {}",
            settings_engine.get_config_path().display(),
            e
        );
    }
    Ok(settings_engine)
}

#[cfg(feature = "gui")]
fn main() -> anyhow::Result<()> {
    let settings_engine = bootstrap()?;
    log::info!("starting Val Browser {}", env!("CARGO_PKG_VERSION"));
    valbrowser::ui::webview_app::run(settings_engine)
}

#[cfg(not(feature = "gui"))]
fn main() -> anyhow::Result<()> {
    let _ = bootstrap()?;
    demo::run()
}

#[cfg(not(feature = "gui"))]
mod demo {
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::Context;
    use chrono::NaiveTime;
    use crossbeam_channel::unbounded;

    use valbrowser::app::App;
    use valbrowser::database::Database;
    use valbrowser::managers::session_manager::{SessionManager, SESSION_FILE_NAME};
    use valbrowser::managers::tab_manager::TabManagerTrait;
    use valbrowser::services::dark_mode_scheduler::FixedClock;
    use valbrowser::services::request_filter::{PopupFilter, RequestFilter};
    use valbrowser::services::settings_engine::SettingsEngine;
    use valbrowser::types::events::ShellEvent;
    use valbrowser::view::headless::HeadlessViewFactory;

    fn section(name: &str) {
        println!("───────────────────────────────────────────────────────────────");
        println!("  {}", name);
        println!("───────────────────────────────────────────────────────────────");
    }

    fn print_shell_events(app: &App) {
        for event in app.drain_shell_events() {
            match event {
                ShellEvent::Notice(n) => println!("  [{}] {}", n.title, n.message),
                ShellEvent::StatusMessage(s) => println!("  status: {}", s),
                ShellEvent::UrlBarText(u) => println!("  url bar: {}", u),
                ShellEvent::ThemeApplied { mode, .. } => println!("  theme: {:?}", mode),
                _ => {}
            }
        }
    }

    pub fn run() -> anyhow::Result<()> {
        println!();
        println!("  Val Browser v{} - Demo Mode (headless engine)", env!("CARGO_PKG_VERSION"));
        println!();

        let scratch = std::env::temp_dir().join("valbrowser-demo");
        std::fs::create_dir_all(&scratch).context("failed to create demo directory")?;

        let (view_tx, view_rx) = unbounded();
        let factory = HeadlessViewFactory::new(view_tx);
        let recorder = factory.recorder();

        let mut app = App::with_parts(
            SettingsEngine::new(Some(scratch.join("settings.json"))),
            Arc::new(Database::open_in_memory()?),
            Box::new(factory),
            SessionManager::new(Some(scratch.join(SESSION_FILE_NAME))),
            view_rx,
        )?;

        section("Startup");
        app.startup();
        app.pump_view_events();
        print_shell_events(&app);

        section("Navigation");
        app.navigate_active("www.rust-lang.org")?;
        app.pump_view_events();
        print_shell_events(&app);
        app.add_bookmark()?;
        app.open_tab(Some("https://example.com/popup"));
        app.pump_view_events();
        if let Some(tab) = app.tab_manager.get_active_tab() {
            println!("  blocked in new tab: {:?}", recorder.record(&tab.id).blocked);
        }
        print_shell_events(&app);

        section("Request filter");
        let filter = PopupFilter::new();
        for url in ["https://ads.example.com/popup.js", "https://example.com/populous", "about:blank"] {
            println!("  {:<40} {:?}", url, filter.decide(url));
        }

        section("Private browsing");
        app.toggle_private_browsing();
        app.navigate_active("secret.example")?;
        app.toggle_private_browsing();
        print_shell_events(&app);
        println!("  history:\n{}", app.history_text()?);

        section("Sidebar");
        for row in app.sidebar()? {
            println!("  {}", row);
        }

        section("Dark-mode schedule");
        let evening = FixedClock(NaiveTime::from_hms_opt(19, 0, 0).context("bad time")?);
        app.tick_scheduler(Duration::from_secs(60), &evening);
        print_shell_events(&app);

        section("Session");
        app.shutdown(true)?;
        println!("  saved {:?}", app.session_data());
        println!("  {}", app.version_info());
        println!();
        Ok(())
    }
}
