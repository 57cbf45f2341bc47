//! Replay configuration persistence
//!
//! Stores user preferences in `~/.config/keyreplay/config.yaml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scheduler::DEFAULT_PROGRESS_EVERY;
use crate::session::DEFAULT_PRE_ROLL;

/// Sequence file name written by the generator
pub const DEFAULT_SEQUENCE_FILE: &str = "typing_sequence.txt";

/// Replay defaults that persist across runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Pre-roll delay used with `--wait-focus`
    #[serde(default = "default_pre_roll_ms")]
    pub pre_roll_ms: u64,

    /// Events between progress reports (0 = only at the end)
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,

    /// Candidate sequence files tried in order when no path is given
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<PathBuf>,
}

fn default_pre_roll_ms() -> u64 {
    DEFAULT_PRE_ROLL.as_millis() as u64
}

fn default_progress_every() -> usize {
    DEFAULT_PROGRESS_EVERY
}

fn default_search_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from(DEFAULT_SEQUENCE_FILE),
        Path::new("..").join(DEFAULT_SEQUENCE_FILE),
        Path::new("output").join(DEFAULT_SEQUENCE_FILE),
        Path::new("replay_tool").join(DEFAULT_SEQUENCE_FILE),
    ]
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            pre_roll_ms: default_pre_roll_ms(),
            progress_every: default_progress_every(),
            search_paths: default_search_paths(),
        }
    }
}

impl ReplayConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to the user config file
    pub fn save(&self) -> Result<PathBuf, String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// First search path entry that exists, resolved against `base`
    pub fn find_sequence_file(&self, base: &Path) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|candidate| base.join(candidate))
            .find(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ReplayConfig::default();
        assert_eq!(config.pre_roll_ms, 3000);
        assert_eq!(config.progress_every, 10);
        assert_eq!(config.search_paths[0], PathBuf::from("typing_sequence.txt"));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: ReplayConfig = serde_yaml::from_str("pre_roll_ms: 500\n").unwrap();
        assert_eq!(config.pre_roll_ms, 500);
        assert_eq!(config.progress_every, 10);
        assert_eq!(config.search_paths.len(), 4);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let config = ReplayConfig {
            pre_roll_ms: 1200,
            progress_every: 5,
            search_paths: vec![PathBuf::from("seq.txt")],
        };
        config.save_to(&path).unwrap();
        assert_eq!(ReplayConfig::load_from(&path), config);
    }

    #[test]
    fn test_invalid_yaml_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "pre_roll_ms: [not, a, number]").unwrap();
        assert_eq!(ReplayConfig::load_from(&path), ReplayConfig::default());
    }

    #[test]
    fn test_find_sequence_file_order() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("output")).unwrap();
        std::fs::write(dir.path().join("output").join(DEFAULT_SEQUENCE_FILE), "x").unwrap();

        let config = ReplayConfig::default();
        assert_eq!(
            config.find_sequence_file(dir.path()),
            Some(dir.path().join("output").join(DEFAULT_SEQUENCE_FILE))
        );

        std::fs::write(dir.path().join(DEFAULT_SEQUENCE_FILE), "x").unwrap();
        assert_eq!(
            config.find_sequence_file(dir.path()),
            Some(dir.path().join(DEFAULT_SEQUENCE_FILE))
        );
    }

    #[test]
    fn test_find_sequence_file_none() {
        let dir = tempdir().unwrap();
        let config = ReplayConfig {
            search_paths: vec![PathBuf::from("missing.txt")],
            ..ReplayConfig::default()
        };
        assert_eq!(config.find_sequence_file(dir.path()), None);
    }
}
