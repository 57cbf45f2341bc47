//! Command-line argument parsing for the replay tool
//!
//! Supports:
//! - Replaying a sequence file (explicit path or search-path default)
//! - Measurement-only mode (no key events)
//! - Pre-roll wait for focusing the target window
//! - Validation-only check and JSON reports

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use crate::config::ReplayConfig;
use crate::session::ReplayOptions;

/// Replay a timed keystroke sequence
#[derive(Parser, Debug)]
#[command(name = "keyreplay", version, about = "Replay a timed keystroke sequence")]
pub struct CliArgs {
    /// Sequence file to replay (defaults to the first match on the search path)
    #[arg(value_name = "SEQUENCE")]
    pub sequence: Option<PathBuf>,

    /// Measure timing only: wait out every delay without sending key events
    #[arg(short = 's', long)]
    pub simulate: bool,

    /// Wait before the first keystroke so the target window can be focused
    #[arg(short = 'w', long)]
    pub wait_focus: bool,

    /// Pre-roll duration in milliseconds (implies --wait-focus)
    #[arg(long, value_name = "MS")]
    pub pre_roll_ms: Option<u64>,

    /// Report progress every N events (0 = only at the end)
    #[arg(long, value_name = "N")]
    pub progress_every: Option<usize>,

    /// Validate the sequence and print a summary without replaying it
    #[arg(long)]
    pub check: bool,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Log every keystroke to the console
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Write the effective configuration to the user config file and exit
    #[arg(long)]
    pub init_config: bool,
}

/// What the binary should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Replay,
    Check,
}

/// Everything needed to start a run, derived from CLI args and config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub sequence: PathBuf,
    pub mode: RunMode,
    pub options: ReplayOptions,
    pub json: bool,
}

impl CliArgs {
    /// Merge CLI flags over the persisted config
    pub fn into_plan(self, config: &ReplayConfig, base: &Path) -> Result<RunPlan, String> {
        let sequence = match self.sequence {
            Some(path) => path,
            None => config.find_sequence_file(base).ok_or_else(|| {
                let tried: Vec<String> = config
                    .search_paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                format!(
                    "No sequence file given and none found (tried: {})",
                    tried.join(", ")
                )
            })?,
        };

        let pre_roll = match (self.pre_roll_ms, self.wait_focus) {
            (Some(ms), _) => Some(Duration::from_millis(ms)),
            (None, true) => Some(Duration::from_millis(config.pre_roll_ms)),
            (None, false) => None,
        };

        let options = ReplayOptions {
            measurement_only: self.simulate,
            pre_roll,
            progress_every: self.progress_every.unwrap_or(config.progress_every),
        };

        Ok(RunPlan {
            sequence,
            mode: if self.check {
                RunMode::Check
            } else {
                RunMode::Replay
            },
            options,
            json: self.json,
        })
    }

    /// Config with CLI overrides applied, for `--init-config`
    pub fn effective_config(&self, config: &ReplayConfig) -> ReplayConfig {
        ReplayConfig {
            pre_roll_ms: self.pre_roll_ms.unwrap_or(config.pre_roll_ms),
            progress_every: self.progress_every.unwrap_or(config.progress_every),
            search_paths: config.search_paths.clone(),
        }
    }
}
