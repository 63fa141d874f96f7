//! Collect Session use case: repeated discoveries accumulated into a mapping.
//!
//! One iteration of the session:
//!
//! 1. "Continue filling the key codes map?" (default yes; no ends the session).
//! 2. Ask for the range (`start`, inclusive `end >= start`) and the four
//!    modifier toggles.
//! 3. Run a bisection discovery over that range.
//! 4. Ask which character the discovered code produced and record it.
//!
//! The mapping is owned by the caller and passed in by `&mut`, so whatever
//! was recorded before an error is still there for the caller to emit.

use keycode_core::{CandidateSet, CodeBounds, KeyCode, KeyCodeMap};
use thiserror::Error;
use tracing::info;

use super::discover_keycode::{DiscoverKeyCodeUseCase, DiscoveryError};
use super::inject_keys::KeyEmitter;
use super::prompts::{ask_single_char, ask_u16, confirm, PromptError, Prompter};

/// Error type for a collection session.  Each variant names the stage that
/// failed.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session configuration failed: {0}")]
    Configure(#[source] PromptError),

    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("character input failed: {0}")]
    Character(#[source] PromptError),
}

impl SessionError {
    /// Returns `true` if the session ended because Ctrl-C was observed.
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            SessionError::Configure(PromptError::Interrupted)
                | SessionError::Character(PromptError::Interrupted)
                | SessionError::Discovery(DiscoveryError::Prompt(PromptError::Interrupted))
        )
    }
}

/// Values offered to the operator when asking for a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDefaults {
    pub start: u16,
    pub end: u16,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self { start: 0, end: 96 }
    }
}

/// Parameters of one discovery, as entered by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub start: u16,
    /// Inclusive.
    pub end: u16,
    /// Modifiers applied to every candidate; the code is ignored.
    pub template: KeyCode,
}

impl SessionConfig {
    /// The exclusive code bounds `[start, end + 1)`.
    pub fn bounds(&self) -> CodeBounds {
        CodeBounds::inclusive(u32::from(self.start), u32::from(self.end))
    }

    pub fn candidates(&self) -> CandidateSet {
        CandidateSet::from_range(self.template, self.bounds())
    }
}

/// Asks the operator for a range and modifier toggles.
///
/// Invalid numbers and an `end` below `start` are re-prompted.
pub fn configure_session<P: Prompter + ?Sized>(
    prompter: &mut P,
    defaults: SessionDefaults,
) -> Result<SessionConfig, PromptError> {
    let start = ask_u16(prompter, "Start key code", defaults.start, |_| Ok(()))?;
    let end = ask_u16(
        prompter,
        "End key code (inclusive)",
        defaults.end.max(start),
        |end| {
            if end >= start {
                Ok(())
            } else {
                Err(format!("end must be greater than or equal to start ({start})"))
            }
        },
    )?;

    let shift = confirm(prompter, "Hold Shift?", false)?;
    let alt = confirm(prompter, "Hold Alt?", false)?;
    let ctrl = confirm(prompter, "Hold Ctrl?", false)?;
    let super_key = confirm(prompter, "Hold Super (Win/Cmd)?", false)?;

    let template = KeyCode::simple(0)
        .with_shift(shift)
        .with_alt(alt)
        .with_ctrl(ctrl)
        .with_super(super_key);

    Ok(SessionConfig { start, end, template })
}

/// The Collect Session use case.
pub struct CollectSessionUseCase<'a, E> {
    discovery: DiscoverKeyCodeUseCase<'a, E>,
    defaults: SessionDefaults,
}

impl<'a, E: KeyEmitter> CollectSessionUseCase<'a, E> {
    pub fn new(discovery: DiscoverKeyCodeUseCase<'a, E>, defaults: SessionDefaults) -> Self {
        Self { discovery, defaults }
    }

    /// Runs discoveries until the operator declines to continue, recording
    /// each result in `mapping`.
    ///
    /// # Errors
    ///
    /// Stops at the first failure of any stage and returns it.  Entries
    /// recorded before the failure stay in `mapping`.
    pub fn run<P: Prompter + ?Sized>(
        &self,
        prompter: &mut P,
        mapping: &mut KeyCodeMap,
    ) -> Result<(), SessionError> {
        loop {
            let more = confirm(prompter, "Continue filling the key codes map?", true)
                .map_err(SessionError::Configure)?;
            if !more {
                info!(entries = mapping.len(), "session finished");
                return Ok(());
            }

            let config =
                configure_session(prompter, self.defaults).map_err(SessionError::Configure)?;
            info!(
                start = config.start,
                end = config.end,
                template = %config.template,
                "starting discovery"
            );

            let code = self.discovery.run(prompter, config.candidates())?;

            let ch = ask_single_char(prompter, "Which character were you looking for?")
                .map_err(SessionError::Character)?;
            mapping.insert(ch, code);
            prompter.notify(&format!("Recorded {ch:?} as {code}"));
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
