//! Character → `KeyCode` mapping.
//!
//! The collector builds a [`KeyCodeMap`] one discovery at a time and emits
//! it as JSON when it stops.  The same JSON, read back, is the
//! caller-supplied table that drives string typing: this crate ships no
//! built-in layout tables.
//!
//! ```json
//! {
//!   "a": { "code": 30, "super": false, "alt": false, "ctrl": false, "shift": false },
//!   "A": { "code": 30, "super": false, "alt": false, "ctrl": false, "shift": true }
//! }
//! ```
//!
//! Inserting a character that is already present replaces the previous
//! value (last write wins).  Callers rely on that to redo a discovery.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::keycode::KeyCode;

/// Errors raised while reading or writing a mapping.
#[derive(Debug, Error)]
pub enum MappingError {
    /// A key in the JSON object was not exactly one character.
    #[error("mapping key {0:?} must be exactly one character")]
    InvalidKey(String),

    /// The JSON text could not be parsed or produced.
    #[error("invalid mapping JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Accumulated character → key code assignments.
///
/// Keys are kept sorted so the emitted JSON is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCodeMap {
    entries: BTreeMap<String, KeyCode>,
}

impl KeyCodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `code` for `ch`, returning the value it replaced, if any.
    pub fn insert(&mut self, ch: char, code: KeyCode) -> Option<KeyCode> {
        let previous = self.entries.insert(ch.to_string(), code);
        if let Some(old) = previous {
            warn!(character = %ch, old = %old, new = %code, "overwriting existing key code mapping");
        }
        previous
    }

    /// Looks up the key code recorded for `ch`.
    pub fn get(&self, ch: char) -> Option<KeyCode> {
        let mut buf = [0u8; 4];
        self.entries.get(&*ch.encode_utf8(&mut buf)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (char, KeyCode)> + '_ {
        // Every stored key is a single character: `insert` and `from_json`
        // are the only writers.
        self.entries
            .iter()
            .filter_map(|(k, v)| k.chars().next().map(|c| (c, *v)))
    }

    /// Serializes the mapping as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, MappingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a mapping previously produced by [`KeyCodeMap::to_json_pretty`].
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Json`] for malformed JSON and
    /// [`MappingError::InvalidKey`] for keys that are not a single character.
    pub fn from_json(text: &str) -> Result<Self, MappingError> {
        let map: Self = serde_json::from_str(text)?;
        if let Some(bad) = map.entries.keys().find(|k| k.chars().count() != 1) {
            return Err(MappingError::InvalidKey(bad.clone()));
        }
        Ok(map)
    }
}

impl FromIterator<(char, KeyCode)> for KeyCodeMap {
    fn from_iter<I: IntoIterator<Item = (char, KeyCode)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (ch, code) in iter {
            map.insert(ch, code);
        }
        map
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
