//! Discover Key Code use case: bisection over a candidate set.
//!
//! Each round types every remaining candidate into whatever window has
//! focus, with a pause after the first half.  The operator watches the
//! output and answers which half produced the wanted character.  The set is
//! replaced by that half until one candidate is left.
//!
//! ```text
//! round:   confirm → announce → sleep(pre) → type [0, mid) → "First half printed"
//!          → sleep(mid) → type [mid, len) → ask 1/2 → narrow
//! ```
//!
//! A set of `n` codes needs `⌈log2 n⌉` rounds and roughly `2n` injections in
//! total, because every round retypes the whole remaining set.

use std::thread;
use std::time::Duration;

use keycode_core::{CandidateSet, KeyCode};
use thiserror::Error;
use tracing::{debug, info};

use super::inject_keys::{InjectionError, KeyEmitter, KeyInjector};
use super::prompts::{choose_half, confirm, PromptError, Prompter};

/// Error type for a discovery run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The candidate set was (or became) empty.
    #[error("no key code candidates to choose from")]
    NoCandidates,

    /// The operator declined to start the next round.
    #[error("discovery aborted by operator")]
    Aborted,

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("key injection failed: {0}")]
    Injection(#[from] InjectionError),
}

/// Pauses and options for a discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Sleep between the operator confirming a round and the first keystroke.
    pub pre_round_pause: Duration,
    /// Sleep between the first and the second half of a round.
    pub mid_round_pause: Duration,
    /// Offer to type the found code once more so the operator can check it.
    pub offer_retype: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            pre_round_pause: Duration::from_secs(5),
            mid_round_pause: Duration::from_secs(5),
            offer_retype: true,
        }
    }
}

impl DiscoveryConfig {
    /// No pauses and no retype offer.
    pub fn immediate() -> Self {
        Self {
            pre_round_pause: Duration::ZERO,
            mid_round_pause: Duration::ZERO,
            offer_retype: false,
        }
    }
}

/// The Discover Key Code use case.
pub struct DiscoverKeyCodeUseCase<'a, E> {
    injector: &'a KeyInjector<E>,
    config: DiscoveryConfig,
}

impl<'a, E: KeyEmitter> DiscoverKeyCodeUseCase<'a, E> {
    pub fn new(injector: &'a KeyInjector<E>, config: DiscoveryConfig) -> Self {
        Self { injector, config }
    }

    /// Narrows `candidates` to the single key code the operator is after.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::NoCandidates`] if `candidates` is empty.  Nothing
    ///   is typed and nothing is asked in that case.
    /// - [`DiscoveryError::Aborted`] if the operator declines a round.
    /// - [`DiscoveryError::Prompt`] if operator input fails.
    /// - [`DiscoveryError::Injection`] if a keystroke cannot be sent.
    pub fn run<P: Prompter + ?Sized>(
        &self,
        prompter: &mut P,
        candidates: CandidateSet,
    ) -> Result<KeyCode, DiscoveryError> {
        if candidates.is_empty() {
            return Err(DiscoveryError::NoCandidates);
        }

        let mut candidates = candidates;
        let mut rounds = 0usize;
        let mut injected = 0usize;

        while candidates.len() > 1 {
            if !confirm(prompter, "Start next typing step?", true)? {
                return Err(DiscoveryError::Aborted);
            }
            rounds += 1;

            if let (Some(first), Some(last)) = (candidates.first(), candidates.last()) {
                prompter.notify(&format!(
                    "Round {rounds}: typing {} codes, first {first}, last {last}",
                    candidates.len()
                ));
            }
            if !self.config.pre_round_pause.is_zero() {
                prompter.notify(&format!(
                    "Typing starts in {} ms, focus a text field",
                    self.config.pre_round_pause.as_millis()
                ));
                thread::sleep(self.config.pre_round_pause);
            }

            let mid = candidates.mid();
            for (index, code) in candidates.as_slice().iter().enumerate() {
                if index == mid {
                    prompter.notify("First half printed");
                    thread::sleep(self.config.mid_round_pause);
                }
                self.injector.inject(*code)?;
                injected += 1;
            }

            let half = choose_half(prompter, "Which half contained the character? (1 or 2)")?;
            candidates = candidates.narrow(half);
            debug!(round = rounds, ?half, remaining = candidates.len(), "candidates narrowed");
        }

        let found = candidates.sole().ok_or(DiscoveryError::NoCandidates)?;
        info!(rounds, injected, key = %found, "key code discovered");
        prompter.notify(&format!("Found key code {found}"));

        if self.config.offer_retype && confirm(prompter, "Type it once more to check?", false)? {
            self.injector.inject(found)?;
        }

        Ok(found)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
