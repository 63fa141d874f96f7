//! Storage infrastructure: configuration file loading.
//!
//! The `config` sub-module reads the TOML configuration from an explicit
//! path or from the platform-appropriate directory, and falls back to
//! defaults when no file exists yet.  The collector never writes a config
//! file; its only output is the mapping JSON.

pub mod config;
