//! The `KeyCode` value type: a platform key identifier plus four modifier flags.
//!
//! A `KeyCode` describes one simulated key combination.  The numeric `code`
//! is whatever the platform's injection API expects (a Windows virtual key,
//! a Linux evdev/X11 keycode, a macOS `CGKeyCode`, ...); this crate never
//! interprets it.  The modifier flags are independent of each other.
//!
//! # Why are the fields private? (for beginners)
//!
//! A `KeyCode` is a *value*: once built it never changes.  Keeping the
//! fields private and offering `with_*` methods that return a **new** value
//! means no caller can accidentally flip a modifier on a code that is
//! already stored in a candidate list or a mapping.  Because the type is
//! `Copy`, producing a modified copy costs nothing.
//!
//! # Serialized form
//!
//! ```json
//! {"code":30,"super":false,"alt":false,"ctrl":false,"shift":true}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A platform key code together with the Shift/Alt/Ctrl/Super modifiers that
/// are held while it is pressed.
///
/// Two `KeyCode`s are equal iff the code and all four modifier flags match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode {
    code: u32,
    /// Win / Cmd / Mod key.
    #[serde(rename = "super")]
    super_key: bool,
    /// Alt / Option key.
    alt: bool,
    ctrl: bool,
    shift: bool,
}

impl KeyCode {
    /// A key code with no modifiers.
    pub const fn simple(code: u32) -> Self {
        Self {
            code,
            super_key: false,
            alt: false,
            ctrl: false,
            shift: false,
        }
    }

    /// A key code pressed together with Shift.
    pub const fn shifted(code: u32) -> Self {
        Self::simple(code).with_shift(true)
    }

    /// A key code pressed together with Alt.
    pub const fn alt(code: u32) -> Self {
        Self::simple(code).with_alt(true)
    }

    /// A key code pressed together with Alt and Shift.
    pub const fn alt_shifted(code: u32) -> Self {
        Self::simple(code).with_alt(true).with_shift(true)
    }

    /// Returns a copy carrying `code` and this value's modifiers.
    ///
    /// This is how a modifier *template* is expanded over a range of codes.
    pub const fn with_code(self, code: u32) -> Self {
        Self { code, ..self }
    }

    /// Returns a copy with the Shift flag set to `on`.
    pub const fn with_shift(self, on: bool) -> Self {
        Self { shift: on, ..self }
    }

    /// Returns a copy with the Alt flag set to `on`.
    pub const fn with_alt(self, on: bool) -> Self {
        Self { alt: on, ..self }
    }

    /// Returns a copy with the Ctrl flag set to `on`.
    pub const fn with_ctrl(self, on: bool) -> Self {
        Self { ctrl: on, ..self }
    }

    /// Returns a copy with the Super (Win/Cmd) flag set to `on`.
    pub const fn with_super(self, on: bool) -> Self {
        Self {
            super_key: on,
            ..self
        }
    }

    /// The platform key identifier.
    pub const fn code(&self) -> u32 {
        self.code
    }

    pub const fn has_shift(&self) -> bool {
        self.shift
    }

    pub const fn has_alt(&self) -> bool {
        self.alt
    }

    pub const fn has_ctrl(&self) -> bool {
        self.ctrl
    }

    pub const fn has_super(&self) -> bool {
        self.super_key
    }

    /// Returns `true` if any modifier flag is set.
    pub const fn has_modifiers(&self) -> bool {
        self.shift || self.alt || self.ctrl || self.super_key
    }

    /// Returns `true` if `other` carries the same four modifier flags.
    pub const fn same_modifiers(&self, other: &KeyCode) -> bool {
        self.shift == other.shift
            && self.alt == other.alt
            && self.ctrl == other.ctrl
            && self.super_key == other.super_key
    }
}

impl fmt::Display for KeyCode {
    /// Renders the JSON record, the same text the final mapping contains.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
