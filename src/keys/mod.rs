//! Key tokens and the keys they resolve to
//!
//! ```text
//! "{Enter}" / "a" / "shift" → resolve_key() → InjectableKey → InjectionBackend
//! ```

mod resolver;
mod types;

pub use resolver::{lookup_named, resolve_key, UnknownKeyError};
pub use types::{InjectableKey, NamedKey};
