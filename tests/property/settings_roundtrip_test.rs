//! Property-based tests for settings serialization and persistence.

use chrono::NaiveTime;
use proptest::prelude::*;
use valbrowser::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use valbrowser::types::session::SessionExitPolicy;
use valbrowser::types::settings::{
    AppearanceSettings, BrowserSettings, DarkModeScheduleSettings, GeneralSettings,
    LoggingSettings, ThemeMode, UpdateSettings,
};
use valbrowser::types::update::ReleaseChannel;

fn arb_time() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60).prop_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

fn arb_settings() -> impl Strategy<Value = BrowserSettings> {
    let general = (
        "https://[a-z]{1,10}\\.example",
        prop_oneof![
            Just(ReleaseChannel::Dev),
            Just(ReleaseChannel::Beta),
            Just(ReleaseChannel::Stable)
        ],
        any::<bool>(),
        prop_oneof![
            Just(SessionExitPolicy::Ask),
            Just(SessionExitPolicy::Always),
            Just(SessionExitPolicy::Never)
        ],
        proptest::option::of("/tmp/[a-z]{1,8}\\.json"),
    )
        .prop_map(|(homepage, channel, restore_session, session_on_exit, session_file)| {
            GeneralSettings {
                homepage,
                channel,
                restore_session,
                session_on_exit,
                session_file,
            }
        });
    let appearance = (
        prop_oneof![Just(ThemeMode::Light), Just(ThemeMode::Dark)],
        any::<bool>(),
        arb_time(),
        arb_time(),
        1u64..3600,
    )
        .prop_map(|(theme, enabled, dark_start, light_start, check_interval_secs)| {
            AppearanceSettings {
                theme,
                dark_mode_schedule: DarkModeScheduleSettings {
                    enabled,
                    dark_start,
                    light_start,
                    check_interval_secs,
                },
            }
        });
    let updates = ("https://[a-z]{1,10}\\.example/latest", any::<bool>()).prop_map(
        |(endpoint, check_on_startup)| UpdateSettings {
            endpoint,
            check_on_startup,
        },
    );
    let logging = prop_oneof![Just("error"), Just("warn"), Just("info"), Just("debug")]
        .prop_map(|level| LoggingSettings {
            level: level.to_string(),
        });

    (general, appearance, updates, logging).prop_map(|(general, appearance, updates, logging)| {
        BrowserSettings {
            general,
            appearance,
            updates,
            logging,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn json_roundtrip(settings in arb_settings()) {
        let json = serde_json::to_string(&settings).unwrap();
        let back: BrowserSettings = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, settings);
    }

    /// Editing through dot paths and reloading from disk sees the same values.
    #[test]
    fn set_value_survives_reload(settings in arb_settings()) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut engine = SettingsEngine::new(Some(path.clone()));
        engine.set_value("general", serde_json::to_value(&settings.general).unwrap()).unwrap();
        engine.set_value("appearance", serde_json::to_value(&settings.appearance).unwrap()).unwrap();
        engine.set_value("updates", serde_json::to_value(&settings.updates).unwrap()).unwrap();
        engine.set_value("logging.level", serde_json::json!(settings.logging.level)).unwrap();

        let mut reloaded = SettingsEngine::new(Some(path));
        prop_assert_eq!(reloaded.load().unwrap(), settings);
    }
}
