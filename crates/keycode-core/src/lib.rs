//! # keycode-core
//!
//! Shared library for keycode-collector containing the key code model, the
//! candidate range generator, the bisection halving rule, and the
//! character → key code mapping.
//!
//! This crate has zero dependencies on OS input APIs, terminals, or timers.
//!
//! # How does key code discovery work? (for beginners)
//!
//! Key injection APIs want a *platform key code*, not a character.  Which
//! code produces `@` depends on the OS, the keyboard layout, and the held
//! modifiers, so the collector finds out empirically:
//!
//! 1. Generate every code in a range, e.g. `[0, 96)`, all with the same
//!    modifiers (the *template*).
//! 2. Type all of them into a text field, pausing between the first and the
//!    second half.
//! 3. The operator says which half printed the wanted character.
//! 4. Keep that half and repeat until one code is left.
//!
//! 96 candidates need only 7 rounds.  The discovered codes are collected in
//! a [`KeyCodeMap`], which later drives string typing.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `keycode_core::KeyCode` instead of `keycode_core::domain::keycode::KeyCode`.
pub use domain::candidates::{
    generate_with_template, CandidateSet, CodeBounds, Half, HalfParseError, DEFAULT_MAX_CODE,
};
pub use domain::keycode::KeyCode;
pub use domain::mapping::{KeyCodeMap, MappingError};
