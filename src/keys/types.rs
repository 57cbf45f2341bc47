//! Core key types: InjectableKey and NamedKey

use std::fmt;

use serde::Serialize;

/// A non-character key that can be injected by name
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum NamedKey {
    Enter,
    Tab,
    Space,
    Backspace,
    Delete,
    Escape,

    // Modifiers
    Shift,
    Control,
    Alt,
    Meta, // Cmd on macOS, Win on Windows
    CapsLock,

    // Arrow keys
    Up,
    Down,
    Left,
    Right,

    // Navigation
    Home,
    End,
    PageUp,
    PageDown,

    // Function keys
    F(u8), // F1-F12
}

impl NamedKey {
    /// Highest function key number the resolver accepts
    pub const MAX_FUNCTION_KEY: u8 = 12;
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedKey::Enter => write!(f, "Enter"),
            NamedKey::Tab => write!(f, "Tab"),
            NamedKey::Space => write!(f, "Space"),
            NamedKey::Backspace => write!(f, "Backspace"),
            NamedKey::Delete => write!(f, "Delete"),
            NamedKey::Escape => write!(f, "Escape"),
            NamedKey::Shift => write!(f, "Shift"),
            NamedKey::Control => write!(f, "Ctrl"),
            NamedKey::Alt => write!(f, "Alt"),
            NamedKey::Meta => write!(f, "Meta"),
            NamedKey::CapsLock => write!(f, "CapsLock"),
            NamedKey::Up => write!(f, "Up"),
            NamedKey::Down => write!(f, "Down"),
            NamedKey::Left => write!(f, "Left"),
            NamedKey::Right => write!(f, "Right"),
            NamedKey::Home => write!(f, "Home"),
            NamedKey::End => write!(f, "End"),
            NamedKey::PageUp => write!(f, "PageUp"),
            NamedKey::PageDown => write!(f, "PageDown"),
            NamedKey::F(n) => write!(f, "F{}", n),
        }
    }
}

/// A key the injection backend can press and release
///
/// Resolved once from the sequence token; nothing downstream looks at the
/// original string again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum InjectableKey {
    /// A printable character, case preserved
    Literal(char),
    /// A named key such as Enter or Shift
    Named(NamedKey),
}

impl From<NamedKey> for InjectableKey {
    fn from(key: NamedKey) -> Self {
        InjectableKey::Named(key)
    }
}

impl fmt::Display for InjectableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectableKey::Literal(c) => write!(f, "'{}'", c.escape_debug()),
            InjectableKey::Named(key) => write!(f, "{{{}}}", key),
        }
    }
}
