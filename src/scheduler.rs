//! Timed execution of a keystroke sequence
//!
//! Per event the scheduler:
//! 1. waits the flight time (the only point where cancellation is observed)
//! 2. resolves the key, skipping the event if it names no known key
//! 3. presses, holds for the dwell time, and releases
//!
//! Nothing interrupts the dwell: once a key is down it is always released
//! before the loop looks at the cancel token again. Waits are plain
//! monotonic sleeps with no drift correction, so a long run finishes a
//! little after the sum of its delays.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::backend::{InjectionBackend, InjectionError, KeyAction};
use crate::cancel::CancelToken;
use crate::keys::{resolve_key, InjectableKey};
use crate::sequence::{KeystrokeEvent, KeystrokeSequence};

/// Default number of events between progress reports
pub const DEFAULT_PROGRESS_EVERY: usize = 10;

/// Execution snapshot emitted every few events
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    /// Events fully handled, including skipped ones
    pub processed: usize,
    pub total: usize,
    pub dispatched: usize,
    pub skipped: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.processed as f64 * 100.0 / self.total as f64
        }
    }
}

/// Event dropped because its key did not resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedKey {
    pub index: usize,
    pub token: String,
}

/// How a run stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEnd {
    /// Every event was processed
    Finished,
    /// Cancellation was observed while waiting before event `at_index`
    Cancelled { at_index: usize },
    /// The backend rejected a key transition of event `at_index`
    Failed {
        at_index: usize,
        action: KeyAction,
        key: InjectableKey,
        error: InjectionError,
    },
}

/// Counters for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub end: RunEnd,
    pub total: usize,
    pub processed: usize,
    pub dispatched: usize,
    pub skipped: Vec<SkippedKey>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Mean wall time per dispatched keystroke
    pub fn mean_per_key(&self) -> Option<Duration> {
        u32::try_from(self.dispatched)
            .ok()
            .filter(|n| *n > 0)
            .map(|n| self.elapsed / n)
    }
}

/// What happened to a single event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Dispatched,
    Skipped,
    Cancelled,
}

/// Sequential replay loop over an injection backend
pub struct TimingScheduler<'a, B: InjectionBackend> {
    backend: B,
    cancel: CancelToken,
    measurement_only: bool,
    progress_every: usize,
    observer: Option<Box<dyn FnMut(&Progress) + 'a>>,
}

impl<'a, B: InjectionBackend> TimingScheduler<'a, B> {
    pub fn new(backend: B, cancel: CancelToken) -> Self {
        Self {
            backend,
            cancel,
            measurement_only: false,
            progress_every: DEFAULT_PROGRESS_EVERY,
            observer: None,
        }
    }

    /// Wait out dwell times without calling the backend
    pub fn measurement_only(mut self, enabled: bool) -> Self {
        self.measurement_only = enabled;
        self
    }

    /// Report progress every `n` events (0 disables periodic reports)
    pub fn progress_every(mut self, n: usize) -> Self {
        self.progress_every = n;
        self
    }

    pub fn on_progress(mut self, observer: impl FnMut(&Progress) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Run every event in order
    pub fn run(&mut self, sequence: &KeystrokeSequence) -> RunSummary {
        let total = sequence.len();
        let start = Instant::now();
        let mut progress = Progress {
            processed: 0,
            total,
            dispatched: 0,
            skipped: 0,
        };
        let mut skipped = Vec::new();

        tracing::info!(
            events = total,
            backend = self.backend.name(),
            measurement_only = self.measurement_only,
            "Replay started"
        );

        let mut end = RunEnd::Finished;
        for (index, event) in sequence.iter().enumerate() {
            match self.step(index, event) {
                Ok(Step::Dispatched) => progress.dispatched += 1,
                Ok(Step::Skipped) => {
                    progress.skipped += 1;
                    skipped.push(SkippedKey {
                        index,
                        token: event.key.clone(),
                    });
                }
                Ok(Step::Cancelled) => {
                    tracing::info!(index, "Replay cancelled");
                    end = RunEnd::Cancelled { at_index: index };
                    break;
                }
                Err((action, key, error)) => {
                    tracing::error!(index, %key, %action, "Injection failed: {}", error);
                    end = RunEnd::Failed {
                        at_index: index,
                        action,
                        key,
                        error,
                    };
                    break;
                }
            }
            progress.processed += 1;
            self.report_progress(&progress);
        }

        RunSummary {
            end,
            total,
            processed: progress.processed,
            dispatched: progress.dispatched,
            skipped,
            elapsed: start.elapsed(),
        }
    }

    fn step(
        &mut self,
        index: usize,
        event: &KeystrokeEvent,
    ) -> Result<Step, (KeyAction, InjectableKey, InjectionError)> {
        if !self.cancel.wait(event.flight()) {
            return Ok(Step::Cancelled);
        }

        let key = match resolve_key(&event.key) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(index, "Skipping event: {}", e);
                return Ok(Step::Skipped);
            }
        };

        if self.measurement_only {
            std::thread::sleep(event.dwell());
            tracing::debug!(index, %key, dwell = event.dwell_ms, "Simulated keystroke");
            return Ok(Step::Dispatched);
        }

        self.transition(key, KeyAction::Down)?;
        std::thread::sleep(event.dwell());
        self.transition(key, KeyAction::Up)?;

        tracing::debug!(index, %key, dwell = event.dwell_ms, flight = event.flight_ms, "Keystroke sent");
        Ok(Step::Dispatched)
    }

    fn transition(
        &mut self,
        key: InjectableKey,
        action: KeyAction,
    ) -> Result<(), (KeyAction, InjectableKey, InjectionError)> {
        self.backend.send(key, action).map_err(|e| (action, key, e))
    }

    fn report_progress(&mut self, progress: &Progress) {
        let periodic = self.progress_every > 0 && progress.processed % self.progress_every == 0;
        let last = progress.processed == progress.total;
        if !(periodic || last) {
            return;
        }

        tracing::info!(
            processed = progress.processed,
            total = progress.total,
            "Progress: {:.0}% ({}/{})",
            progress.percent(),
            progress.processed,
            progress.total
        );
        if let Some(observer) = self.observer.as_mut() {
            observer(progress);
        }
    }
}
