// Val Browser platform paths
// Resolves per-user config and data directories through `dirs`, which follows
// XDG on Linux, Application Support on macOS and %APPDATA% on Windows.

use std::path::PathBuf;

const APP_DIR_NAME: &str = "valbrowser";

fn fallback_base() -> PathBuf {
    dirs::home_dir().unwrap_or_else(std::env::temp_dir)
}

/// Directory holding `settings.json`.
///
/// - **Linux**: `~/.config/valbrowser` (or `$XDG_CONFIG_HOME/valbrowser`)
/// - **macOS**: `~/Library/Application Support/valbrowser`
/// - **Windows**: `%APPDATA%\valbrowser`
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| fallback_base().join(".config"))
        .join(APP_DIR_NAME)
}

/// Directory holding the database and `session.json`.
///
/// - **Linux**: `~/.local/share/valbrowser` (or `$XDG_DATA_HOME/valbrowser`)
/// - **macOS**: `~/Library/Application Support/valbrowser`
/// - **Windows**: `%APPDATA%\valbrowser`
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| fallback_base().join(".local").join("share"))
        .join(APP_DIR_NAME)
}
