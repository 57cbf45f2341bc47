//! Injection backends: the OS-facing side of a replay
//!
//! The scheduler only talks to [`InjectionBackend`]. The crate ships a
//! [`RecordingBackend`] that captures calls in memory and, with the
//! `os-inject` feature, an enigo-based backend that issues real key events.

#[cfg(feature = "os-inject")]
mod enigo_injector;
mod recording;

#[cfg(feature = "os-inject")]
pub use enigo_injector::EnigoBackend;
pub use recording::{BackendCall, RecordingBackend};

use serde::Serialize;

use crate::keys::InjectableKey;

/// Key transition sent to a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyAction {
    Down,
    Up,
}

impl std::fmt::Display for KeyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyAction::Down => write!(f, "key-down"),
            KeyAction::Up => write!(f, "key-up"),
        }
    }
}

/// Performs key-down / key-up at the OS level
pub trait InjectionBackend {
    /// Short name for logs and reports
    fn name(&self) -> &str;

    fn key_down(&mut self, key: InjectableKey) -> Result<(), InjectionError>;

    fn key_up(&mut self, key: InjectableKey) -> Result<(), InjectionError>;

    /// Dispatch one transition
    fn send(&mut self, key: InjectableKey, action: KeyAction) -> Result<(), InjectionError> {
        match action {
            KeyAction::Down => self.key_down(key),
            KeyAction::Up => self.key_up(key),
        }
    }
}

impl<B: InjectionBackend + ?Sized> InjectionBackend for &mut B {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn key_down(&mut self, key: InjectableKey) -> Result<(), InjectionError> {
        (**self).key_down(key)
    }

    fn key_up(&mut self, key: InjectableKey) -> Result<(), InjectionError> {
        (**self).key_up(key)
    }
}

impl<B: InjectionBackend + ?Sized> InjectionBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn key_down(&mut self, key: InjectableKey) -> Result<(), InjectionError> {
        (**self).key_down(key)
    }

    fn key_up(&mut self, key: InjectableKey) -> Result<(), InjectionError> {
        (**self).key_up(key)
    }
}

/// Category of an OS-level injection failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InjectionErrorKind {
    /// Backend cannot express this key
    InvalidKey,
    /// Backend could not be created or lost its connection
    Unavailable,
    Other,
}

/// A key-down or key-up the backend could not perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectionError {
    pub kind: InjectionErrorKind,
    pub message: String,
}

impl InjectionError {
    pub fn new(kind: InjectionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for InjectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            InjectionErrorKind::InvalidKey => write!(f, "Invalid key: {}", self.message),
            InjectionErrorKind::Unavailable => {
                write!(f, "Injection unavailable: {}", self.message)
            }
            InjectionErrorKind::Other => write!(f, "Injection failed: {}", self.message),
        }
    }
}

impl std::error::Error for InjectionError {}
