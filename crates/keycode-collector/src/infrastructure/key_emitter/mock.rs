//! Recording key emitter for unit and integration tests.
//!
//! # Why a recording emitter?
//!
//! The real emitter presses keys on the machine running the tests, and
//! nothing it does can be observed from Rust code afterwards.  The
//! `RecordingKeyEmitter` replaces every OS call with a push onto an
//! in-memory list, so a test can assert exactly what was emitted and in
//! what order:
//!
//! ```ignore
//! let injector = KeyInjector::new(RecordingKeyEmitter::new(), InjectorConfig::immediate());
//! injector.inject(KeyCode::shifted(30)).unwrap();
//!
//! let emitter = injector.into_emitter();
//! assert_eq!(emitter.pressed(), vec![KeyCode::shifted(30)]);
//! ```
//!
//! # `should_fail` flag
//!
//! Set `should_fail = true` (or use [`RecordingKeyEmitter::failing`]) to
//! make every call return [`InjectionError::Platform`].  Failed calls are
//! not recorded.

use keycode_core::KeyCode;

use crate::application::inject_keys::{InjectionError, KeyEmitter, NamedKey};

/// One recorded emitter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmittedKey {
    Down(KeyCode),
    Up(KeyCode),
    NamedDown(NamedKey),
    NamedUp(NamedKey),
    ReleaseAll,
}

/// An emitter that records calls instead of touching the OS.
#[derive(Debug, Default)]
pub struct RecordingKeyEmitter {
    events: Vec<EmittedKey>,
    /// When `true`, every method returns an `InjectionError::Platform`.
    pub should_fail: bool,
}

impl RecordingKeyEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// An emitter whose every call fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Every recorded call, oldest first.
    pub fn events(&self) -> &[EmittedKey] {
        &self.events
    }

    /// The key codes passed to `press`, in order.
    pub fn pressed(&self) -> Vec<KeyCode> {
        self.events
            .iter()
            .filter_map(|e| match e {
                EmittedKey::Down(k) => Some(*k),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, event: EmittedKey) -> Result<(), InjectionError> {
        if self.should_fail {
            return Err(InjectionError::Platform("mock failure".to_string()));
        }
        self.events.push(event);
        Ok(())
    }
}

impl KeyEmitter for RecordingKeyEmitter {
    fn press(&mut self, key: &KeyCode) -> Result<(), InjectionError> {
        self.record(EmittedKey::Down(*key))
    }

    fn release(&mut self, key: &KeyCode) -> Result<(), InjectionError> {
        self.record(EmittedKey::Up(*key))
    }

    fn press_named(&mut self, key: NamedKey) -> Result<(), InjectionError> {
        self.record(EmittedKey::NamedDown(key))
    }

    fn release_named(&mut self, key: NamedKey) -> Result<(), InjectionError> {
        self.record(EmittedKey::NamedUp(key))
    }

    fn release_all(&mut self) -> Result<(), InjectionError> {
        self.record(EmittedKey::ReleaseAll)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
