//! In-memory backend that records every call

use std::time::Instant;

use super::{InjectionBackend, InjectionError, InjectionErrorKind, KeyAction};
use crate::keys::InjectableKey;

/// One recorded key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCall {
    pub key: InjectableKey,
    pub action: KeyAction,
    pub at: Instant,
}

/// Records key transitions instead of sending them
///
/// Can be told to reject the n-th call of a given action, which is how
/// fatal injection failures are exercised.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    fail_on: Option<(KeyAction, usize)>,
    downs: usize,
    ups: usize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `nth` (0-based) call of `action`
    pub fn failing_on(action: KeyAction, nth: usize) -> Self {
        Self {
            fail_on: Some((action, nth)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Recorded transitions without timestamps
    pub fn actions(&self) -> Vec<(KeyAction, InjectableKey)> {
        self.calls.iter().map(|c| (c.action, c.key)).collect()
    }

    /// Keys pressed but not yet released
    pub fn held_keys(&self) -> Vec<InjectableKey> {
        let mut held = Vec::new();
        for call in &self.calls {
            match call.action {
                KeyAction::Down => held.push(call.key),
                KeyAction::Up => {
                    if let Some(pos) = held.iter().rposition(|k| *k == call.key) {
                        held.remove(pos);
                    }
                }
            }
        }
        held
    }

    fn record(&mut self, key: InjectableKey, action: KeyAction) -> Result<(), InjectionError> {
        let count = match action {
            KeyAction::Down => &mut self.downs,
            KeyAction::Up => &mut self.ups,
        };
        let nth = *count;
        *count += 1;

        if self.fail_on == Some((action, nth)) {
            return Err(InjectionError::new(
                InjectionErrorKind::Other,
                format!("{} {} rejected", action, key),
            ));
        }

        self.calls.push(BackendCall {
            key,
            action,
            at: Instant::now(),
        });
        Ok(())
    }
}

impl InjectionBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn key_down(&mut self, key: InjectableKey) -> Result<(), InjectionError> {
        self.record(key, KeyAction::Down)
    }

    fn key_up(&mut self, key: InjectableKey) -> Result<(), InjectionError> {
        self.record(key, KeyAction::Up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::NamedKey;

    #[test]
    fn test_records_in_order() {
        let mut backend = RecordingBackend::new();
        backend.key_down(InjectableKey::Literal('a')).unwrap();
        backend.key_up(InjectableKey::Literal('a')).unwrap();
        assert_eq!(
            backend.actions(),
            vec![
                (KeyAction::Down, InjectableKey::Literal('a')),
                (KeyAction::Up, InjectableKey::Literal('a')),
            ]
        );
        assert!(backend.held_keys().is_empty());
    }

    #[test]
    fn test_failing_on_nth_call() {
        let mut backend = RecordingBackend::failing_on(KeyAction::Up, 1);
        let shift = InjectableKey::Named(NamedKey::Shift);
        backend.key_down(shift).unwrap();
        backend.key_up(shift).unwrap();
        backend.key_down(shift).unwrap();
        let err = backend.key_up(shift).unwrap_err();
        assert_eq!(err.kind, InjectionErrorKind::Other);
        assert_eq!(backend.held_keys(), vec![shift]);
    }

    #[test]
    fn test_send_dispatches_by_action() {
        let mut backend = RecordingBackend::new();
        let key = InjectableKey::Named(NamedKey::Enter);
        backend.send(key, KeyAction::Down).unwrap();
        backend.send(key, KeyAction::Up).unwrap();
        assert_eq!(backend.calls().len(), 2);
        assert_eq!(backend.calls()[1].action, KeyAction::Up);
    }
}
