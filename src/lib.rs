//! keyreplay - timed keystroke replay
//!
//! Replays a keystroke sequence file (key, dwell, flight per line) through
//! an injection backend, holding each key for its dwell time and pausing
//! for its flight time before the press.
//!
//! ```text
//! sequence file → parse_sequence → ReplaySession → TimingScheduler → InjectionBackend
//!                                                         ↑
//!                                                    resolve_key
//! ```

pub mod backend;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod keys;
pub mod scheduler;
pub mod sequence;
pub mod session;
pub mod tracing;

// Re-export commonly used types
pub use backend::{InjectionBackend, InjectionError, KeyAction, RecordingBackend};
pub use cancel::CancelToken;
pub use config::ReplayConfig;
pub use keys::{resolve_key, InjectableKey, NamedKey};
pub use sequence::{parse_sequence, KeystrokeEvent, KeystrokeSequence, SequenceError};
pub use session::{Outcome, ReplayOptions, ReplayReport, ReplaySession, SessionState};
