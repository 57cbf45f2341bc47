//! Sequence file parsing
//!
//! The format is one header line followed by pipe-delimited data lines:
//!
//! ```text
//! key|dwell|flight
//! a|40|0
//! {Enter}|35|60
//! ```
//!
//! Malformed data lines are dropped with a warning so that a stray line
//! degrades the replay instead of aborting it. A bad header or a file with
//! no usable lines is an error.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::model::{KeystrokeEvent, KeystrokeSequence};

/// Literal first line of every sequence file
pub const SEQUENCE_HEADER: &str = "key|dwell|flight";

/// Field delimiter for data lines
pub const FIELD_DELIMITER: char = '|';

/// Result of a successful parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSequence {
    pub sequence: KeystrokeSequence,
    /// Data lines that were dropped, in file order
    pub warnings: Vec<LineWarning>,
}

/// Why a data line was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineWarningKind {
    TooFewFields,
    EmptyKey,
    InvalidDwell,
    InvalidFlight,
}

impl std::fmt::Display for LineWarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewFields => write!(f, "expected key|dwell|flight"),
            Self::EmptyKey => write!(f, "empty key"),
            Self::InvalidDwell => write!(f, "dwell is not a non-negative integer"),
            Self::InvalidFlight => write!(f, "flight is not a non-negative integer"),
        }
    }
}

/// A data line skipped during parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineWarning {
    /// 1-based line number in the file
    pub line: usize,
    pub kind: LineWarningKind,
    pub content: String,
}

impl std::fmt::Display for LineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {} ({:?})", self.line, self.kind, self.content)
    }
}

/// Errors that abort loading a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// File could not be read
    Io { path: PathBuf, message: String },
    /// First non-blank line is not the expected header
    Format { found: Option<String> },
    /// No data line survived parsing
    Empty { skipped: usize },
    /// The session already holds a sequence
    AlreadyLoaded,
}

impl std::fmt::Display for SequenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceError::Io { path, message } => {
                write!(f, "Failed to read {}: {}", path.display(), message)
            }
            SequenceError::Format { found: Some(line) } => write!(
                f,
                "Invalid sequence header: expected {:?}, found {:?}",
                SEQUENCE_HEADER, line
            ),
            SequenceError::Format { found: None } => {
                write!(f, "Invalid sequence file: missing {:?} header", SEQUENCE_HEADER)
            }
            SequenceError::Empty { skipped } => write!(
                f,
                "Sequence contains no valid events ({} malformed line(s) skipped)",
                skipped
            ),
            SequenceError::AlreadyLoaded => write!(f, "A sequence is already loaded"),
        }
    }
}

impl std::error::Error for SequenceError {}

/// Parse sequence text into events
pub fn parse_sequence(text: &str) -> Result<ParsedSequence, SequenceError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    match lines.next() {
        Some((_, header)) if header.trim() == SEQUENCE_HEADER => {}
        Some((_, header)) => {
            return Err(SequenceError::Format {
                found: Some(header.trim().to_string()),
            })
        }
        None => return Err(SequenceError::Format { found: None }),
    }

    let mut sequence = KeystrokeSequence::default();
    let mut warnings = Vec::new();

    for (line_no, line) in lines {
        match parse_line(line) {
            Ok(event) => sequence.push(event),
            Err(kind) => {
                tracing::warn!(line = line_no, content = line, "Skipping sequence line: {}", kind);
                warnings.push(LineWarning {
                    line: line_no,
                    kind,
                    content: line.to_string(),
                });
            }
        }
    }

    if sequence.is_empty() {
        return Err(SequenceError::Empty {
            skipped: warnings.len(),
        });
    }

    tracing::debug!(
        events = sequence.len(),
        skipped = warnings.len(),
        "Parsed keystroke sequence"
    );

    Ok(ParsedSequence { sequence, warnings })
}

/// Parse one data line
///
/// The last two fields are dwell and flight; everything before them is the
/// key, so a literal `|` key (`||40|0`) survives.
fn parse_line(line: &str) -> Result<KeystrokeEvent, LineWarningKind> {
    let mut fields = line.rsplitn(3, FIELD_DELIMITER);
    let flight = fields.next();
    let dwell = fields.next();
    let key = fields.next();

    let (Some(key), Some(dwell), Some(flight)) = (key, dwell, flight) else {
        return Err(LineWarningKind::TooFewFields);
    };

    let key = key.trim();
    if key.is_empty() {
        return Err(LineWarningKind::EmptyKey);
    }

    let dwell_ms = parse_millis(dwell).ok_or(LineWarningKind::InvalidDwell)?;
    let flight_ms = parse_millis(flight).ok_or(LineWarningKind::InvalidFlight)?;

    Ok(KeystrokeEvent::new(key, dwell_ms, flight_ms))
}

/// Non-negative integer milliseconds; rejects signs, fractions and blanks
fn parse_millis(field: &str) -> Option<u64> {
    let field = field.trim();
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Read and parse a sequence file
pub fn load_sequence(path: &Path) -> Result<ParsedSequence, SequenceError> {
    let text = std::fs::read_to_string(path).map_err(|e| SequenceError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    tracing::info!("Loaded sequence file {}", path.display());
    parse_sequence(&text)
}
