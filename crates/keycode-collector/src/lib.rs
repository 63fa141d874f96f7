//! keycode-collector library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does keycode-collector do? (for beginners)
//!
//! Programs that type on behalf of a user have to send *key codes* to the
//! OS, and which code yields which character depends on the platform and
//! the keyboard layout.  This crate:
//!
//! 1. Injects timed key presses with optional Shift/Alt/Ctrl/Super held
//!    (`application::inject_keys`).
//! 2. Finds the code behind a character interactively: it types halves of a
//!    code range and the operator says which half printed the character
//!    (`application::discover_keycode`).
//! 3. Repeats that for as many characters as the operator likes and prints
//!    the resulting character → code mapping as JSON
//!    (`application::collect_session`, `infrastructure::output`).
//! 4. Types arbitrary text using such a mapping
//!    (`KeyInjector::type_string`).

/// Application layer: use cases for the collector.
pub mod application;

/// Infrastructure layer: emitters, prompters, config, and output.
pub mod infrastructure;
