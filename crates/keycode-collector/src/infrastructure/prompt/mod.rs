//! Terminal prompter: the `Prompter` implementation used by the binary.
//!
//! Prompts and notices are written to the output stream (stderr in the
//! binary) so that stdout carries nothing but the final mapping JSON, and
//! `keycode-collector > map.json` produces a clean file.
//!
//! # Ctrl-C handling (for beginners)
//!
//! A blocking `read_line` cannot be cancelled from another thread.  The
//! binary therefore installs a Ctrl-C handler that only sets a shared
//! `AtomicBool`.  The prompter checks that flag before showing a prompt and
//! again after each line is read, and reports [`PromptError::Interrupted`]
//! when it is set.  The session unwinds from there and the mapping is
//! emitted as usual.

pub mod scripted;

use std::io::{self, BufRead, Stderr, StdinLock, Write};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing::warn;

use crate::application::prompts::{PromptError, Prompter};

/// Line-based prompter over any reader/writer pair.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
    interrupted: Arc<AtomicBool>,
}

impl TerminalPrompter<StdinLock<'static>, Stderr> {
    /// Reads from stdin and writes to stderr.
    pub fn stdio(interrupted: Arc<AtomicBool>) -> Self {
        Self::new(io::stdin().lock(), io::stderr(), interrupted)
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W, interrupted: Arc<AtomicBool>) -> Self {
        Self {
            input,
            output,
            interrupted,
        }
    }

    /// Consumes the prompter and returns the output writer.
    pub fn into_output(self) -> W {
        self.output
    }

    fn check_interrupt(&self) -> Result<(), PromptError> {
        if self.interrupted.load(Ordering::SeqCst) {
            Err(PromptError::Interrupted)
        } else {
            Ok(())
        }
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn ask(&mut self, label: &str, default: Option<&str>) -> Result<String, PromptError> {
        self.check_interrupt()?;

        match default {
            Some(d) => write!(self.output, "{label} [{d}]: ")?,
            None => write!(self.output, "{label}: ")?,
        }
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        self.check_interrupt()?;
        if read == 0 {
            return Err(PromptError::Cancelled);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    fn notify(&mut self, message: &str) {
        if let Err(e) = writeln!(self.output, "{message}") {
            warn!(error = %e, "failed to write operator notice");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
