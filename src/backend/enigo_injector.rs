//! OS key injection through enigo

use enigo::{Direction, Enigo, InputError, Key, Keyboard, Settings};

use super::{InjectionBackend, InjectionError, InjectionErrorKind};
use crate::keys::{InjectableKey, NamedKey};

/// Sends real key events to the focused window
pub struct EnigoBackend {
    enigo: Enigo,
}

impl EnigoBackend {
    /// Connect to the platform input system
    pub fn new() -> Result<Self, InjectionError> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| {
            InjectionError::new(InjectionErrorKind::Unavailable, e.to_string())
        })?;
        tracing::debug!("Connected enigo injection backend");
        Ok(Self { enigo })
    }

    fn press(&mut self, key: InjectableKey, direction: Direction) -> Result<(), InjectionError> {
        self.enigo
            .key(to_enigo_key(key), direction)
            .map_err(|e| InjectionError::new(error_kind(&e), format!("{}: {}", key, e)))
    }
}

/// Key mapping failures are the key's fault; anything else is the platform's
fn error_kind(error: &InputError) -> InjectionErrorKind {
    match error {
        InputError::Mapping(_) | InputError::Unmapping(_) | InputError::InvalidInput(_) => {
            InjectionErrorKind::InvalidKey
        }
        _ => InjectionErrorKind::Other,
    }
}

impl InjectionBackend for EnigoBackend {
    fn name(&self) -> &str {
        "enigo"
    }

    fn key_down(&mut self, key: InjectableKey) -> Result<(), InjectionError> {
        self.press(key, Direction::Press)
    }

    fn key_up(&mut self, key: InjectableKey) -> Result<(), InjectionError> {
        self.press(key, Direction::Release)
    }
}

fn to_enigo_key(key: InjectableKey) -> Key {
    match key {
        InjectableKey::Literal(c) => Key::Unicode(c),
        InjectableKey::Named(named) => match named {
            NamedKey::Enter => Key::Return,
            NamedKey::Tab => Key::Tab,
            NamedKey::Space => Key::Space,
            NamedKey::Backspace => Key::Backspace,
            NamedKey::Delete => Key::Delete,
            NamedKey::Escape => Key::Escape,
            NamedKey::Shift => Key::Shift,
            NamedKey::Control => Key::Control,
            NamedKey::Alt => Key::Alt,
            NamedKey::Meta => Key::Meta,
            NamedKey::CapsLock => Key::CapsLock,
            NamedKey::Up => Key::UpArrow,
            NamedKey::Down => Key::DownArrow,
            NamedKey::Left => Key::LeftArrow,
            NamedKey::Right => Key::RightArrow,
            NamedKey::Home => Key::Home,
            NamedKey::End => Key::End,
            NamedKey::PageUp => Key::PageUp,
            NamedKey::PageDown => Key::PageDown,
            NamedKey::F(n) => function_key(n),
        },
    }
}

fn function_key(n: u8) -> Key {
    match n {
        1 => Key::F1,
        2 => Key::F2,
        3 => Key::F3,
        4 => Key::F4,
        5 => Key::F5,
        6 => Key::F6,
        7 => Key::F7,
        8 => Key::F8,
        9 => Key::F9,
        10 => Key::F10,
        11 => Key::F11,
        _ => Key::F12,
    }
}
