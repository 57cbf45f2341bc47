//! Replay session: load, optional pre-roll, run, report
//!
//! ```text
//! Idle → Loaded → [AwaitingFocus] → Running → Completed | Aborted | Failed
//!   └──────────────── parse error ───────────────────────────→ Failed
//! ```
//!
//! A session runs at most once. There is no resume: a new session always
//! starts from the first event.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};

use crate::backend::InjectionBackend;
use crate::cancel::CancelToken;
use crate::scheduler::{Progress, RunEnd, SkippedKey, TimingScheduler, DEFAULT_PROGRESS_EVERY};
use crate::sequence::{
    load_sequence, parse_sequence, KeystrokeSequence, LineWarning, ParsedSequence, SequenceError,
};

/// Default pre-roll before the first keystroke
pub const DEFAULT_PRE_ROLL: Duration = Duration::from_millis(3000);

/// Countdown granularity during the pre-roll
const PRE_ROLL_TICK: Duration = Duration::from_secs(1);

/// Immutable settings for one replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Wait out timings without sending key events
    pub measurement_only: bool,
    /// Delay before the first event, to let the operator focus a window
    pub pre_roll: Option<Duration>,
    /// Events between progress reports
    pub progress_every: usize,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            measurement_only: false,
            pre_roll: None,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Loaded,
    AwaitingFocus,
    Running,
    Completed,
    Aborted,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Aborted | SessionState::Failed
        )
    }
}

/// Terminal result of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    /// Stopped by cancellation; `at_index` is the first event not started
    Aborted { at_index: usize },
    /// Load error (no index) or fatal injection error at `at_index`
    Failed {
        at_index: Option<usize>,
        reason: String,
    },
}

impl Outcome {
    /// Process exit status for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Completed => 0,
            Outcome::Failed { .. } => 1,
            Outcome::Aborted { .. } => 2,
        }
    }
}

/// Summary printed once at the end of a replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub source: Option<PathBuf>,
    pub outcome: Outcome,
    pub measurement_only: bool,
    pub total_events: usize,
    /// Events fully handled, including skipped ones
    pub processed: usize,
    /// Index of the last event handled before the run stopped
    pub last_completed: Option<usize>,
    /// Keystrokes sent (or simulated in measurement-only mode)
    pub dispatched: usize,
    pub skipped_keys: Vec<SkippedKey>,
    pub parse_warnings: Vec<LineWarning>,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    #[serde(rename = "mean_per_key_ms", serialize_with = "serialize_opt_millis")]
    pub mean_per_key: Option<Duration>,
}

impl ReplayReport {
    fn not_run(source: Option<PathBuf>, reason: String, measurement_only: bool) -> Self {
        Self {
            source,
            outcome: Outcome::Failed {
                at_index: None,
                reason,
            },
            measurement_only,
            total_events: 0,
            processed: 0,
            last_completed: None,
            dispatched: 0,
            skipped_keys: Vec::new(),
            parse_warnings: Vec::new(),
            elapsed: Duration::ZERO,
            mean_per_key: None,
        }
    }

    /// Parse warnings plus skipped keys
    pub fn warnings(&self) -> usize {
        self.parse_warnings.len() + self.skipped_keys.len()
    }

    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }
}

impl std::fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = if self.measurement_only {
            "simulated"
        } else {
            "sent"
        };
        match &self.outcome {
            Outcome::Completed => write!(
                f,
                "Replay completed: {}/{} events, {} keystrokes {}",
                self.processed, self.total_events, self.dispatched, verb
            )?,
            Outcome::Aborted { at_index } => write!(
                f,
                "Replay aborted before event {} of {} (last completed: {}): {} keystrokes {}",
                at_index + 1,
                self.total_events,
                LastCompleted(self.last_completed),
                self.dispatched,
                verb
            )?,
            Outcome::Failed {
                at_index: Some(index),
                reason,
            } => write!(
                f,
                "Replay failed at event {} of {} (last completed: {}): {} ({} keystrokes {})",
                index + 1,
                self.total_events,
                LastCompleted(self.last_completed),
                reason,
                self.dispatched,
                verb
            )?,
            Outcome::Failed {
                at_index: None,
                reason,
            } => return write!(f, "Replay failed: {}", reason),
        }

        write!(
            f,
            ", {} warning(s), {:.2}s elapsed",
            self.warnings(),
            self.elapsed.as_secs_f64()
        )?;
        if let Some(mean) = self.mean_per_key {
            write!(f, " ({:.1} ms/key)", mean.as_secs_f64() * 1000.0)?;
        }
        Ok(())
    }
}

/// 1-based event number for display, or "none"
struct LastCompleted(Option<usize>);

impl std::fmt::Display for LastCompleted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(index) => write!(f, "event {}", index + 1),
            None => write!(f, "none"),
        }
    }
}

fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

fn serialize_opt_millis<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match d {
        Some(d) => serialize_millis(d, s),
        None => s.serialize_none(),
    }
}

/// One replay of one sequence
#[derive(Debug)]
pub struct ReplaySession {
    options: ReplayOptions,
    cancel: CancelToken,
    state: SessionState,
    source: Option<PathBuf>,
    parsed: Option<ParsedSequence>,
    load_error: Option<SequenceError>,
}

impl ReplaySession {
    pub fn new(options: ReplayOptions, cancel: CancelToken) -> Self {
        Self {
            options,
            cancel,
            state: SessionState::Idle,
            source: None,
            parsed: None,
            load_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &ReplayOptions {
        &self.options
    }

    pub fn sequence(&self) -> Option<&KeystrokeSequence> {
        self.parsed.as_ref().map(|p| &p.sequence)
    }

    pub fn warnings(&self) -> &[LineWarning] {
        self.parsed.as_ref().map_or(&[], |p| p.warnings.as_slice())
    }

    /// Load and validate a sequence file
    pub fn load_file(&mut self, path: &Path) -> Result<&ParsedSequence, SequenceError> {
        self.ensure_idle()?;
        self.source = Some(path.to_path_buf());
        let result = load_sequence(path);
        self.finish_load(result)
    }

    /// Load and validate sequence text
    pub fn load_text(&mut self, text: &str) -> Result<&ParsedSequence, SequenceError> {
        self.ensure_idle()?;
        let result = parse_sequence(text);
        self.finish_load(result)
    }

    /// A session holds one sequence; later loads are rejected without touching it
    fn ensure_idle(&self) -> Result<(), SequenceError> {
        if self.state == SessionState::Idle {
            Ok(())
        } else {
            tracing::warn!(state = ?self.state, "Ignoring second sequence load");
            Err(SequenceError::AlreadyLoaded)
        }
    }

    fn finish_load(
        &mut self,
        result: Result<ParsedSequence, SequenceError>,
    ) -> Result<&ParsedSequence, SequenceError> {
        match result {
            Ok(parsed) => {
                tracing::info!(
                    events = parsed.sequence.len(),
                    warnings = parsed.warnings.len(),
                    planned_ms = parsed.sequence.planned_duration().as_millis() as u64,
                    "Sequence loaded"
                );
                self.state = SessionState::Loaded;
                Ok(&*self.parsed.insert(parsed))
            }
            Err(e) => {
                tracing::error!("Failed to load sequence: {}", e);
                self.state = SessionState::Failed;
                self.load_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Execute the loaded sequence against `backend`
    pub fn run<B: InjectionBackend>(&mut self, backend: B) -> ReplayReport {
        self.run_with_progress(backend, |_| {})
    }

    /// Execute the loaded sequence, calling `observer` on each progress report
    pub fn run_with_progress<B: InjectionBackend>(
        &mut self,
        backend: B,
        observer: impl FnMut(&Progress),
    ) -> ReplayReport {
        let measurement_only = self.options.measurement_only;

        let parsed = match (self.state, self.parsed.as_ref()) {
            (SessionState::Loaded, Some(parsed)) => parsed,
            (state, _) => {
                let reason = match (&self.load_error, state) {
                    (Some(e), _) => e.to_string(),
                    (None, SessionState::Idle) => "No sequence loaded".to_string(),
                    (None, _) => "Session has already run".to_string(),
                };
                self.state = SessionState::Failed;
                return ReplayReport::not_run(self.source.clone(), reason, measurement_only);
            }
        };

        if let Some(pre_roll) = self.options.pre_roll {
            self.state = SessionState::AwaitingFocus;
            if !count_down(&self.cancel, pre_roll) {
                tracing::info!("Replay cancelled during pre-roll");
                self.state = SessionState::Aborted;
                return ReplayReport {
                    source: self.source.clone(),
                    outcome: Outcome::Aborted { at_index: 0 },
                    measurement_only,
                    total_events: parsed.sequence.len(),
                    processed: 0,
                    last_completed: None,
                    dispatched: 0,
                    skipped_keys: Vec::new(),
                    parse_warnings: parsed.warnings.clone(),
                    elapsed: Duration::ZERO,
                    mean_per_key: None,
                };
            }
        }

        self.state = SessionState::Running;
        let mut scheduler = TimingScheduler::new(backend, self.cancel.clone())
            .measurement_only(measurement_only)
            .progress_every(self.options.progress_every)
            .on_progress(observer);
        let summary = scheduler.run(&parsed.sequence);

        let (state, outcome) = match summary.end {
            RunEnd::Finished => (SessionState::Completed, Outcome::Completed),
            RunEnd::Cancelled { at_index } => {
                (SessionState::Aborted, Outcome::Aborted { at_index })
            }
            RunEnd::Failed {
                at_index,
                action,
                key,
                ref error,
            } => (
                SessionState::Failed,
                Outcome::Failed {
                    at_index: Some(at_index),
                    reason: format!("{} {}: {}", action, key, error),
                },
            ),
        };
        self.state = state;

        let report = ReplayReport {
            source: self.source.clone(),
            outcome,
            measurement_only,
            total_events: summary.total,
            processed: summary.processed,
            last_completed: summary.processed.checked_sub(1),
            dispatched: summary.dispatched,
            mean_per_key: summary.mean_per_key(),
            skipped_keys: summary.skipped,
            parse_warnings: parsed.warnings.clone(),
            elapsed: summary.elapsed,
        };
        tracing::info!("{}", report);
        report
    }
}

/// Cancellable pre-roll; returns `false` if cancelled before it elapsed
fn count_down(cancel: &CancelToken, duration: Duration) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return true;
        }
        let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
        tracing::info!("Replay starts in {}s, focus the target window", secs);

        let tick = remaining - PRE_ROLL_TICK * (secs.saturating_sub(1) as u32);
        if !cancel.wait(tick.min(PRE_ROLL_TICK)) {
            return false;
        }
    }
}

/// Load `path` and replay it in one go
pub fn replay_file<B: InjectionBackend>(
    path: &Path,
    options: ReplayOptions,
    cancel: CancelToken,
    backend: B,
) -> ReplayReport {
    let mut session = ReplaySession::new(options, cancel);
    // A load error is carried into the report by run()
    let _ = session.load_file(path);
    session.run(backend)
}
