//! Dry-run key emitter: logs every key event instead of sending it.
//!
//! This is the default backend of the binary.  It lets an operator walk
//! through a session (or check a keymap with `type`) on a machine where
//! synthetic input is unavailable or unwanted.  Events are logged at `info`
//! level on the `keycode_collector::dry_run` target.

use keycode_core::KeyCode;
use tracing::info;

use crate::application::inject_keys::{InjectionError, KeyEmitter, NamedKey};

#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunKeyEmitter;

impl DryRunKeyEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl KeyEmitter for DryRunKeyEmitter {
    fn press(&mut self, key: &KeyCode) -> Result<(), InjectionError> {
        info!(target: "keycode_collector::dry_run", key = %key, "key down");
        Ok(())
    }

    fn release(&mut self, key: &KeyCode) -> Result<(), InjectionError> {
        info!(target: "keycode_collector::dry_run", key = %key, "key up");
        Ok(())
    }

    fn press_named(&mut self, key: NamedKey) -> Result<(), InjectionError> {
        info!(target: "keycode_collector::dry_run", ?key, "named key down");
        Ok(())
    }

    fn release_named(&mut self, key: NamedKey) -> Result<(), InjectionError> {
        info!(target: "keycode_collector::dry_run", ?key, "named key up");
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), InjectionError> {
        info!(target: "keycode_collector::dry_run", "release all keys");
        Ok(())
    }
}
