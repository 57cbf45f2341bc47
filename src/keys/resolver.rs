//! Resolution of sequence key tokens into injectable keys
//!
//! Accepted token forms, in order of precedence:
//! - `{Name}` - bracketed named key (`{Enter}`, `{Backspace}`), or an
//!   escaped literal character (`{+}`, `{{}`)
//! - `a` - any single character
//! - `shift`, `Ctrl`, `enter` - bare alias, case-insensitive

use super::types::{InjectableKey, NamedKey};

/// A key token that names no known key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKeyError {
    pub token: String,
}

impl std::fmt::Display for UnknownKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown key: {:?}", self.token)
    }
}

impl std::error::Error for UnknownKeyError {}

/// Resolve a key token from a sequence file
pub fn resolve_key(token: &str) -> Result<InjectableKey, UnknownKeyError> {
    if let Some(inner) = strip_brackets(token) {
        return resolve_bracketed(inner).ok_or_else(|| unknown(token));
    }

    if let Some(c) = single_char(token) {
        return Ok(InjectableKey::Literal(c));
    }

    lookup_named(token.trim())
        .map(InjectableKey::Named)
        .ok_or_else(|| unknown(token))
}

fn unknown(token: &str) -> UnknownKeyError {
    UnknownKeyError {
        token: token.to_string(),
    }
}

/// Inner text of a `{...}` token, if it is one
fn strip_brackets(token: &str) -> Option<&str> {
    let inner = token.strip_prefix('{')?.strip_suffix('}')?;
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

fn resolve_bracketed(inner: &str) -> Option<InjectableKey> {
    // `{+}`, `{!}`, `{{}` and friends escape a literal character
    if let Some(c) = single_char(inner) {
        return Some(InjectableKey::Literal(c));
    }
    lookup_named(inner.trim()).map(InjectableKey::Named)
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let c = chars.next()?;
    if chars.next().is_none() {
        Some(c)
    } else {
        None
    }
}

/// Case-insensitive lookup in the named-key alias table
pub fn lookup_named(name: &str) -> Option<NamedKey> {
    let lower = name.to_ascii_lowercase();
    let key = match lower.as_str() {
        "enter" | "return" => NamedKey::Enter,
        "tab" => NamedKey::Tab,
        "space" | "spacebar" => NamedKey::Space,
        "backspace" | "bs" | "back" => NamedKey::Backspace,
        "delete" | "del" => NamedKey::Delete,
        "escape" | "esc" => NamedKey::Escape,

        "shift" | "lshift" | "rshift" => NamedKey::Shift,
        "ctrl" | "control" | "lctrl" | "rctrl" => NamedKey::Control,
        "alt" | "option" | "opt" | "lalt" | "ralt" => NamedKey::Alt,
        "meta" | "super" | "win" | "lwin" | "rwin" | "cmd" => NamedKey::Meta,
        "capslock" | "caps" => NamedKey::CapsLock,

        "up" | "arrowup" => NamedKey::Up,
        "down" | "arrowdown" => NamedKey::Down,
        "left" | "arrowleft" => NamedKey::Left,
        "right" | "arrowright" => NamedKey::Right,

        "home" => NamedKey::Home,
        "end" => NamedKey::End,
        "pageup" | "pgup" => NamedKey::PageUp,
        "pagedown" | "pgdown" | "pgdn" => NamedKey::PageDown,

        _ => return parse_function_key(&lower).map(NamedKey::F),
    };
    Some(key)
}

/// `f1`..`f12`
fn parse_function_key(lower: &str) -> Option<u8> {
    let digits = lower.strip_prefix('f')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u8 = digits.parse().ok()?;
    (1..=NamedKey::MAX_FUNCTION_KEY).contains(&n).then_some(n)
}
