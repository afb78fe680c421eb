use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::session::SessionExitPolicy;
use super::update::ReleaseChannel;

/// Home target used when no homepage has been configured.
pub const DEFAULT_HOME_URL: &str = "https://www.google.com";

/// Release metadata endpoint queried by "Check for Updates".
pub const DEFAULT_UPDATE_ENDPOINT: &str = "https://api.github.com/repos/owgydz/val/releases/latest";

/// Top-level browser settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BrowserSettings {
    pub general: GeneralSettings,
    pub appearance: AppearanceSettings,
    pub updates: UpdateSettings,
    pub logging: LoggingSettings,
}

/// General browser settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    pub homepage: String,
    pub channel: ReleaseChannel,
    pub restore_session: bool,
    pub session_on_exit: SessionExitPolicy,
    /// Overrides `<data_dir>/session.json`.
    pub session_file: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            homepage: DEFAULT_HOME_URL.to_string(),
            channel: ReleaseChannel::Stable,
            restore_session: true,
            session_on_exit: SessionExitPolicy::Ask,
            session_file: None,
        }
    }
}

/// Shell color theme.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// Theme and dark-mode schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppearanceSettings {
    pub theme: ThemeMode,
    pub dark_mode_schedule: DarkModeScheduleSettings,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Light,
            dark_mode_schedule: DarkModeScheduleSettings::default(),
        }
    }
}

/// When the scheduler switches to dark, when back to light, and how often it looks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DarkModeScheduleSettings {
    pub enabled: bool,
    pub dark_start: NaiveTime,
    pub light_start: NaiveTime,
    pub check_interval_secs: u64,
}

impl Default for DarkModeScheduleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dark_start: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
            light_start: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
            check_interval_secs: 60,
        }
    }
}

/// Update-check settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateSettings {
    pub endpoint: String,
    pub check_on_startup: bool,
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_UPDATE_ENDPOINT.to_string(),
            check_on_startup: false,
        }
    }
}

/// Log verbosity used when `RUST_LOG` is not set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
