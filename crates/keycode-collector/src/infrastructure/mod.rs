//! Infrastructure layer for the collector.
//!
//! Contains the adapters the application layer talks to through traits,
//! plus file and stream I/O.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `keycode_core`, but MUST NOT be imported by the `application` or domain
//! layers (tests excepted).
//!
//! # Sub-modules
//!
//! - **`key_emitter`** – `KeyEmitter` implementations: the dry-run logger,
//!   the optional `enigo` backend, and a recording emitter for tests.
//!
//! - **`prompt`** – `Prompter` implementations: the terminal prompter used
//!   by the binary and a scripted prompter for tests.
//!
//! - **`storage`** – TOML configuration loading.
//!
//! - **`output`** – The guard that writes the collected mapping on every
//!   exit path.

pub mod key_emitter;
pub mod output;
pub mod prompt;
pub mod storage;
