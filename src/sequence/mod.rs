//! Timed keystroke sequences
//!
//! A sequence file is produced by an external generator and replayed
//! front to back. This module owns the data model and the text format.

mod model;
mod parser;
mod writer;

pub use model::{KeystrokeEvent, KeystrokeSequence};
pub use parser::{
    load_sequence, parse_sequence, LineWarning, LineWarningKind, ParsedSequence, SequenceError,
    FIELD_DELIMITER, SEQUENCE_HEADER,
};
pub use writer::{save_sequence, write_sequence};
