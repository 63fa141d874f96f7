//! Application layer use cases for the collector.
//!
//! # What use cases does the collector have?
//!
//! - **`inject_keys`** – Turns `KeyCode`s and strings into timed
//!   press/release sequences.  The OS call is made by a `KeyEmitter`
//!   implementation that is injected at construction time.
//!
//! - **`discover_keycode`** – Finds the one key code that produces a
//!   character by typing halves of a candidate set and asking the operator
//!   which half printed it.
//!
//! - **`collect_session`** – Repeats discoveries and records each result in
//!   a caller-owned `KeyCodeMap`.
//!
//! - **`prompts`** – The `Prompter` operator boundary plus the validating
//!   helpers (yes/no, numbers, half choice, single character) the other use
//!   cases build on.

pub mod collect_session;
pub mod discover_keycode;
pub mod inject_keys;
pub mod prompts;
