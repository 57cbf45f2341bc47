//! Logging setup for the replay binary
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - every keystroke with its timing
//! - `RUST_LOG=keyreplay::scheduler=debug` - module-level filtering
//!
//! # Log Files
//!
//! Logs are written to `~/.config/keyreplay/logs/keyreplay.log` with daily rotation.
//! File logging uses debug level so every run leaves a per-key trace.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Console filter when RUST_LOG is unset
const DEFAULT_CONSOLE_FILTER: &str = "warn,keyreplay=info";

/// Initialize tracing subscriber with console and file logging
///
/// Console output goes to stderr so stdout stays clean for `--json`.
pub fn init(verbose: bool) {
    let console_filter = if verbose {
        EnvFilter::new("warn,keyreplay=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER))
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "keyreplay.log");
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("keyreplay=debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
