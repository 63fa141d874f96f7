//! `KeyEmitter` implementations.
//!
//! - **`dry_run`** – logs events; the default backend of the binary.
//! - **`enigo_emitter`** – real OS injection, compiled with the `enigo` feature.
//! - **`mock`** – records events for tests.

pub mod dry_run;
pub mod mock;

#[cfg(feature = "enigo")]
pub mod enigo_emitter;
