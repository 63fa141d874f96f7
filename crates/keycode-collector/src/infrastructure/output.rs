//! Mapping output guard.
//!
//! Whatever happens during a session (the operator stops, an input fails,
//! Ctrl-C is pressed, or code panics) the mapping collected so far must be
//! printed.  [`MappingOutput`] owns the mapping and writes it as pretty JSON
//! to its writer exactly once: either when [`MappingOutput::finish`] is
//! called, or when the guard is dropped.
//!
//! # Why `Drop`? (for beginners)
//!
//! Rust runs `Drop::drop` for every value that goes out of scope, including
//! during a panic unwind and after an early `return` through `?`.  Putting
//! the emission in `drop` means no exit path can forget it.

use std::io::{self, Write};

use keycode_core::{KeyCodeMap, MappingError};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("failed to write mapping: {0}")]
    Io(#[from] io::Error),
}

/// Owns a [`KeyCodeMap`] and writes it to `W` when finished or dropped.
pub struct MappingOutput<W: Write> {
    mapping: KeyCodeMap,
    writer: Option<W>,
}

impl<W: Write> MappingOutput<W> {
    pub fn new(writer: W) -> Self {
        Self {
            mapping: KeyCodeMap::new(),
            writer: Some(writer),
        }
    }

    pub fn mapping_mut(&mut self) -> &mut KeyCodeMap {
        &mut self.mapping
    }

    /// Writes the mapping now and returns the writer.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if serialization or writing fails.
    pub fn finish(mut self) -> Result<W, OutputError> {
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "mapping already written"))?;
        write_mapping(&self.mapping, &mut writer)?;
        Ok(writer)
    }
}

impl<W: Write> Drop for MappingOutput<W> {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = write_mapping(&self.mapping, &mut writer) {
                error!(error = %e, "could not emit key code mapping");
            }
        }
    }
}

fn write_mapping<W: Write>(mapping: &KeyCodeMap, writer: &mut W) -> Result<(), OutputError> {
    let json = mapping.to_json_pretty()?;
    writeln!(writer, "{json}")?;
    writer.flush()?;
    info!(entries = mapping.len(), "key code mapping emitted");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
