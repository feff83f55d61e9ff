//! Interactive terminal prompts.
//!
//! Handles asking for values on stdin, re-asking until a validation rule
//! accepts the answer, and reading passwords with echo disabled.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use nix::sys::termios::{self, LocalFlags, SetArg};

use crate::domain::{AppError, Result};

/// Source of interactive answers.
pub trait Prompt {
    /// Ask a question and return the trimmed answer.
    ///
    /// # Errors
    /// Returns error if input is closed or cannot be read.
    fn ask(&self, message: &str) -> Result<String>;

    /// Ask for a secret without echoing it.
    ///
    /// # Errors
    /// Returns error if input is closed or cannot be read.
    fn ask_secret(&self, message: &str) -> Result<String>;

    /// Tell the user why an answer was rejected.
    fn notice(&self, message: &str);
}

/// Ask until `parse` accepts the answer.
///
/// An empty answer is replaced by `default` when one is given. Only
/// validation errors cause a re-prompt; anything else is returned.
///
/// # Errors
/// Returns error if input fails or `parse` returns a non-validation error.
pub fn ask_until_valid<T>(
    prompt: &dyn Prompt,
    message: &str,
    default: Option<&str>,
    parse: impl Fn(&str) -> Result<T>,
) -> Result<T> {
    loop {
        let mut answer = prompt.ask(message)?;
        if answer.is_empty() {
            if let Some(default) = default {
                answer = default.to_string();
            }
        }

        match parse(&answer) {
            Ok(value) => return Ok(value),
            Err(e @ AppError::Validation { .. }) => prompt.notice(&e.to_string()),
            Err(e) => return Err(e),
        }
    }
}

/// Ask a yes/no question; an empty answer selects `default`.
///
/// # Errors
/// Returns error if input fails.
pub fn confirm(prompt: &dyn Prompt, message: &str, default: bool) -> Result<bool> {
    loop {
        match prompt.ask(message)?.to_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            other => prompt.notice(&format!("Please answer yes or no, not '{other}'")),
        }
    }
}

/// Prompt backed by the process's stdin and stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn read_line(message: &str) -> Result<String> {
        print!("{message}");
        io::stdout()
            .flush()
            .map_err(|e| AppError::io("Failed to write prompt", e))?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| AppError::io("Failed to read answer", e))?;

        if read == 0 {
            return Err(AppError::aborted("input closed before an answer was given"));
        }

        Ok(line.trim().to_string())
    }
}

impl Prompt for TerminalPrompt {
    fn ask(&self, message: &str) -> Result<String> {
        Self::read_line(message)
    }

    fn ask_secret(&self, message: &str) -> Result<String> {
        let stdin = io::stdin();
        let Ok(original) = termios::tcgetattr(&stdin) else {
            // Not a terminal, nothing to hide.
            return Self::read_line(message);
        };

        let mut hidden = original.clone();
        hidden.local_flags.remove(LocalFlags::ECHO);
        termios::tcsetattr(&stdin, SetArg::TCSANOW, &hidden)
            .map_err(|e| AppError::io("Failed to disable terminal echo", e.into()))?;

        let answer = Self::read_line(message);

        termios::tcsetattr(&stdin, SetArg::TCSANOW, &original)
            .map_err(|e| AppError::io("Failed to restore terminal echo", e.into()))?;
        println!();

        answer
    }

    fn notice(&self, message: &str) {
        println!("{}", message.yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validate::parse_period;
    use crate::infrastructure::testing::ScriptedPrompt;

    #[test]
    fn test_ask_until_valid_reprompts() {
        let prompt = ScriptedPrompt::new(["abc", "0", "30"]);
        let period = ask_until_valid(&prompt, "Period: ", None, parse_period).unwrap();

        assert_eq!(period, 30);
        assert_eq!(prompt.notices().len(), 2);
    }

    #[test]
    fn test_ask_until_valid_uses_default() {
        let prompt = ScriptedPrompt::new([""]);
        let period = ask_until_valid(&prompt, "Period: ", Some("60"), parse_period).unwrap();
        assert_eq!(period, 60);
    }

    #[test]
    fn test_ask_until_valid_propagates_other_errors() {
        let prompt = ScriptedPrompt::new(["x"]);
        let result: Result<()> =
            ask_until_valid(&prompt, "Value: ", None, |_| Err(AppError::aborted("stop")));
        assert!(matches!(result, Err(AppError::Aborted { .. })));
    }

    #[test]
    fn test_confirm() {
        let prompt = ScriptedPrompt::new(["maybe", "YES"]);
        assert!(confirm(&prompt, "Continue? ", false).unwrap());
        assert_eq!(prompt.notices().len(), 1);

        let prompt = ScriptedPrompt::new([""]);
        assert!(!confirm(&prompt, "Continue? ", false).unwrap());
    }

    #[test]
    fn test_exhausted_script_aborts() {
        let prompt = ScriptedPrompt::new(Vec::<&str>::new());
        assert!(matches!(prompt.ask("Name: "), Err(AppError::Aborted { .. })));
    }
}
