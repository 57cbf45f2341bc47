//! Abort signal shared between the replay loop and whoever stops it

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest uninterrupted sleep inside a cancellable wait
const POLL_SLICE: Duration = Duration::from_millis(5);

/// Cloneable abort flag
///
/// Raised from a signal handler or another thread, observed by the scheduler
/// only at wait boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` unless cancelled first
    ///
    /// Returns `false` if the wait was cut short (or the token was already
    /// raised), `true` once the full duration has elapsed.
    pub fn wait(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return false;
        }
        let deadline = Instant::now() + duration;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep((deadline - now).min(POLL_SLICE));
            if self.is_cancelled() {
                return false;
            }
        }
    }
}
