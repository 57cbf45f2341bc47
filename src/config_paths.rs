//! Where keyreplay keeps its files
//!
//! One directory per user holds the replay defaults and the log files:
//!
//! ```text
//! <config dir>/keyreplay/
//!   config.yaml     pre-roll, progress cadence, sequence search paths
//!   logs/           daily rolling keyreplay.log
//! ```
//!
//! `<config dir>` is `$XDG_CONFIG_HOME` or `~/.config` on Unix/macOS and
//! `%APPDATA%` on Windows. Sequence files themselves are not stored here;
//! they are found relative to the working directory.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "keyreplay";
const CONFIG_FILE: &str = "config.yaml";
const LOGS_DIR: &str = "logs";

/// Per-user keyreplay directory, if the platform has one
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var_os("APPDATA").map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .map(|base| base.join(APP_DIR))
    }
}

/// Replay defaults written by `--init-config`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Target of the file log layer
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(LOGS_DIR))
}

/// Create the logs directory on first use
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = logs_dir().ok_or_else(|| "No config directory available".to_string())?;
    create_dir(&logs)?;
    Ok(logs)
}

fn create_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))
}
