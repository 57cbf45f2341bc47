//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::io::Write;
use std::time::Instant;

use keyreplay::backend::{InjectionBackend, InjectionError, KeyAction};
use keyreplay::{CancelToken, InjectableKey, KeystrokeEvent, KeystrokeSequence};
use tempfile::NamedTempFile;

/// Build a sequence from (key, dwell, flight) triples
pub fn sequence(events: &[(&str, u64, u64)]) -> KeystrokeSequence {
    events
        .iter()
        .map(|(key, dwell, flight)| KeystrokeEvent::new(*key, *dwell, *flight))
        .collect()
}

/// Write sequence text to a temporary file
pub fn sequence_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Backend that raises a cancel token once a number of keys were released
///
/// Lets tests place an abort exactly in the wait before a given event.
pub struct CancellingBackend {
    pub calls: Vec<(KeyAction, InjectableKey, Instant)>,
    cancel: CancelToken,
    cancel_after_releases: usize,
    releases: usize,
}

impl CancellingBackend {
    pub fn new(cancel: CancelToken, cancel_after_releases: usize) -> Self {
        Self {
            calls: Vec::new(),
            cancel,
            cancel_after_releases,
            releases: 0,
        }
    }

    pub fn actions(&self) -> Vec<(KeyAction, InjectableKey)> {
        self.calls.iter().map(|(a, k, _)| (*a, *k)).collect()
    }
}

impl InjectionBackend for CancellingBackend {
    fn name(&self) -> &str {
        "cancelling"
    }

    fn key_down(&mut self, key: InjectableKey) -> Result<(), InjectionError> {
        self.calls.push((KeyAction::Down, key, Instant::now()));
        Ok(())
    }

    fn key_up(&mut self, key: InjectableKey) -> Result<(), InjectionError> {
        self.calls.push((KeyAction::Up, key, Instant::now()));
        self.releases += 1;
        if self.releases == self.cancel_after_releases {
            self.cancel.cancel();
        }
        Ok(())
    }
}
