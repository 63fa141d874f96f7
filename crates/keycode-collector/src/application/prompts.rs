//! Operator prompts: the `Prompter` boundary and validating helpers.
//!
//! The discovery engine and the session driver never read a terminal
//! directly.  They talk to a [`Prompter`], which only knows how to show a
//! label and return one raw line of text.  Everything about *what counts as
//! a valid answer* lives in the helpers below, so it can be tested with a
//! scripted prompter instead of a real keyboard.
//!
//! # Re-prompting (for beginners)
//!
//! Every helper loops until the operator gives an acceptable answer.  An
//! invalid answer is never an error: the helper prints a short hint through
//! [`Prompter::notify`] and asks again.  The only ways out of the loop other
//! than a valid answer are the [`PromptError`] variants: the input stream
//! closed, Ctrl-C was observed, or an I/O call failed.

use keycode_core::Half;
use thiserror::Error;

/// Failure to obtain an answer from the operator.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The input stream reached end-of-file.
    #[error("operator input closed")]
    Cancelled,

    /// An interrupt (Ctrl-C) was observed.
    #[error("interrupted by operator")]
    Interrupted,

    #[error("prompt I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Operator boundary.
pub trait Prompter {
    /// Shows `label` (and `default`, if any) and returns the operator's line
    /// without its line terminator.
    fn ask(&mut self, label: &str, default: Option<&str>) -> Result<String, PromptError>;

    /// Shows an informational message.
    fn notify(&mut self, message: &str);
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn ask(&mut self, label: &str, default: Option<&str>) -> Result<String, PromptError> {
        (**self).ask(label, default)
    }

    fn notify(&mut self, message: &str) {
        (**self).notify(message)
    }
}

/// Interprets a yes/no answer.  Empty input selects `default`.
pub fn parse_yes_no(input: &str, default: bool) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Asks a yes/no question until the answer is recognised.
pub fn confirm<P: Prompter + ?Sized>(
    prompter: &mut P,
    question: &str,
    default: bool,
) -> Result<bool, PromptError> {
    let hint = if default { "Y/n" } else { "y/N" };
    let label = format!("{question} ({hint})");
    loop {
        let answer = prompter.ask(&label, None)?;
        match parse_yes_no(&answer, default) {
            Some(yes) => return Ok(yes),
            None => prompter.notify("please answer y or n"),
        }
    }
}

/// Asks for a 16-bit unsigned integer.
///
/// Empty input selects `default`.  Parsed values are passed to `validate`;
/// an `Err(message)` shows `message` and asks again.
pub fn ask_u16<P, F>(
    prompter: &mut P,
    label: &str,
    default: u16,
    validate: F,
) -> Result<u16, PromptError>
where
    P: Prompter + ?Sized,
    F: Fn(u16) -> Result<(), String>,
{
    let shown = default.to_string();
    loop {
        let answer = prompter.ask(label, Some(&shown))?;
        let trimmed = answer.trim();
        let value = if trimmed.is_empty() {
            default
        } else {
            match trimmed.parse::<u16>() {
                Ok(v) => v,
                Err(e) => {
                    prompter.notify(&format!("invalid number {trimmed:?}: {e}"));
                    continue;
                }
            }
        };
        match validate(value) {
            Ok(()) => return Ok(value),
            Err(message) => prompter.notify(&message),
        }
    }
}

/// Asks which half contained the character: `1` or `2`.
pub fn choose_half<P: Prompter + ?Sized>(prompter: &mut P, label: &str) -> Result<Half, PromptError> {
    loop {
        let answer = prompter.ask(label, None)?;
        match answer.parse::<Half>() {
            Ok(half) => return Ok(half),
            Err(e) => prompter.notify(&e.to_string()),
        }
    }
}

/// Asks for exactly one character (one code point).
///
/// The answer is not trimmed: a single space is a valid character.
pub fn ask_single_char<P: Prompter + ?Sized>(prompter: &mut P, label: &str) -> Result<char, PromptError> {
    loop {
        let answer = prompter.ask(label, None)?;
        let mut chars = answer.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => return Ok(ch),
            _ => prompter.notify("please enter exactly one character"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
