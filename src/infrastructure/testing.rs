//! Test doubles for the runner and prompt capabilities.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::domain::{AppError, Result};

use super::prompt::Prompt;
use super::runner::{CommandRunner, ExternalCommand};

/// Runner that records every command and answers with scripted exit codes.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: RefCell<Vec<String>>,
    failures: Vec<(String, i32)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit with `code` for every command whose display starts with `prefix`.
    pub fn fail_on(mut self, prefix: &str, code: i32) -> Self {
        self.failures.push((prefix.to_string(), code));
        self
    }

    /// Displayed commands in the order they ran.
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &ExternalCommand) -> Result<i32> {
        let line = command.to_string();
        self.commands.borrow_mut().push(line.clone());

        Ok(self
            .failures
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map_or(0, |(_, code)| *code))
    }
}

/// Prompt that replays a fixed list of answers.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: RefCell<VecDeque<String>>,
    questions: RefCell<Vec<String>>,
    notices: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: RefCell::new(answers.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.borrow().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.borrow().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&self, message: &str) -> Result<String> {
        self.questions.borrow_mut().push(message.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| AppError::aborted(format!("no scripted answer for '{message}'")))
    }

    fn ask_secret(&self, message: &str) -> Result<String> {
        self.ask(message)
    }

    fn notice(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }
}
