//! Scripted prompter for tests.
//!
//! Answers come from a fixed list, in order.  Every label asked and every
//! notice shown is recorded so tests can assert on the conversation.  Once
//! the list is exhausted `ask` returns [`PromptError::Cancelled`], or
//! [`PromptError::Interrupted`] after [`ScriptedPrompter::then_interrupt`].

use std::collections::VecDeque;

use crate::application::prompts::{PromptError, Prompter};

#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
    notices: Vec<String>,
    interrupt_when_exhausted: bool,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Report an interrupt instead of closed input once the answers run out.
    pub fn then_interrupt(mut self) -> Self {
        self.interrupt_when_exhausted = true;
        self
    }

    /// Labels passed to `ask`, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Messages passed to `notify`, in order.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, label: &str, _default: Option<&str>) -> Result<String, PromptError> {
        self.asked.push(label.to_string());
        match self.answers.pop_front() {
            Some(answer) => Ok(answer),
            None if self.interrupt_when_exhausted => Err(PromptError::Interrupted),
            None => Err(PromptError::Cancelled),
        }
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}
