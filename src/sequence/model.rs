//! Keystroke events and the ordered sequence replayed from a file

use std::time::Duration;

use serde::Serialize;

/// One typed key with its timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeystrokeEvent {
    /// Symbolic key token as written in the file (`a`, `{Enter}`, `shift`)
    pub key: String,
    /// How long the key is held down
    pub dwell_ms: u64,
    /// Pause before this key is pressed, measured from the previous release
    pub flight_ms: u64,
}

impl KeystrokeEvent {
    pub fn new(key: impl Into<String>, dwell_ms: u64, flight_ms: u64) -> Self {
        Self {
            key: key.into(),
            dwell_ms,
            flight_ms,
        }
    }

    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    pub fn flight(&self) -> Duration {
        Duration::from_millis(self.flight_ms)
    }
}

/// Events in typing order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeystrokeSequence {
    events: Vec<KeystrokeEvent>,
}

impl KeystrokeSequence {
    pub fn new(events: Vec<KeystrokeEvent>) -> Self {
        Self { events }
    }

    pub fn push(&mut self, event: KeystrokeEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[KeystrokeEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeystrokeEvent> {
        self.events.iter()
    }

    /// Sum of every dwell and flight time: the shortest possible replay
    pub fn planned_duration(&self) -> Duration {
        let total_ms = self
            .events
            .iter()
            .fold(0u64, |acc, e| {
                acc.saturating_add(e.dwell_ms).saturating_add(e.flight_ms)
            });
        Duration::from_millis(total_ms)
    }
}

impl<'a> IntoIterator for &'a KeystrokeSequence {
    type Item = &'a KeystrokeEvent;
    type IntoIter = std::slice::Iter<'a, KeystrokeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl FromIterator<KeystrokeEvent> for KeystrokeSequence {
    fn from_iter<I: IntoIterator<Item = KeystrokeEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}
