//! Sequence file serialization

use std::path::Path;

use super::model::KeystrokeSequence;
use super::parser::{FIELD_DELIMITER, SEQUENCE_HEADER};

/// Serialize a sequence in the file format read by `parse_sequence`
pub fn write_sequence(sequence: &KeystrokeSequence) -> String {
    let mut out = String::with_capacity(SEQUENCE_HEADER.len() + 1 + sequence.len() * 12);
    out.push_str(SEQUENCE_HEADER);
    out.push('\n');
    for event in sequence {
        out.push_str(&event.key);
        out.push(FIELD_DELIMITER);
        out.push_str(&event.dwell_ms.to_string());
        out.push(FIELD_DELIMITER);
        out.push_str(&event.flight_ms.to_string());
        out.push('\n');
    }
    out
}

/// Write a sequence file, creating parent directories as needed
pub fn save_sequence(path: &Path, sequence: &KeystrokeSequence) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
    }

    std::fs::write(path, write_sequence(sequence))
        .map_err(|e| format!("Failed to write sequence to {}: {}", path.display(), e))?;

    tracing::info!("Saved {} events to {}", sequence.len(), path.display());
    Ok(())
}
