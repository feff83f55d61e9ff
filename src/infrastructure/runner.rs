//! External command execution.
//!
//! Components receive a `&dyn CommandRunner` at construction, so tests can
//! substitute a recording fake for the real process spawner.

use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, Stdio};

use crate::domain::{AppError, Result};

/// An external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
    silent: bool,
    redacted: Option<String>,
}

impl ExternalCommand {
    /// Start building an invocation of `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            silent: false,
            redacted: None,
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Discard the program's stdout and stderr.
    #[must_use]
    pub const fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Replace `secret` with `***` whenever the command is displayed.
    #[must_use]
    pub fn redact(mut self, secret: impl Into<String>) -> Self {
        self.redacted = Some(secret.into());
        self
    }

    /// Program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments in order.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Whether output is discarded.
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        self.silent
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }

        match self.redacted.as_deref() {
            Some(secret) if !secret.is_empty() => write!(f, "{}", line.replace(secret, "***")),
            _ => write!(f, "{line}"),
        }
    }
}

/// Runs external programs and reports their exit codes.
pub trait CommandRunner {
    /// Run `command` to completion and return its exit code.
    ///
    /// # Errors
    /// Returns error only if the program cannot be started.
    fn run(&self, command: &ExternalCommand) -> Result<i32>;

    /// Run `command` and turn a non-zero exit into `AppError::CommandFailed`.
    ///
    /// # Errors
    /// Returns error if the program cannot be started or exits non-zero.
    fn run_checked(&self, command: &ExternalCommand) -> Result<()> {
        match self.run(command)? {
            0 => Ok(()),
            code => Err(AppError::CommandFailed {
                command: command.to_string(),
                code,
            }),
        }
    }

    /// Run `command` as a yes/no probe: a non-zero exit is `false`.
    ///
    /// # Errors
    /// Returns error only if the program cannot be started.
    fn probe(&self, command: &ExternalCommand) -> Result<bool> {
        Ok(self.run(command)? == 0)
    }
}

/// Runner that spawns real processes and waits for them.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ExternalCommand) -> Result<i32> {
        tracing::debug!(command = %command, "Running command");

        let mut process = Command::new(command.program());
        process.args(command.arguments());
        if command.is_silent() {
            process.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let status = process
            .status()
            .map_err(|e| AppError::io(format!("Failed to start `{}`", command.program()), e))?;

        // Killed by a signal: report it the way a shell would.
        let code = status
            .code()
            .unwrap_or_else(|| 128 + status.signal().unwrap_or_default());

        tracing::debug!(command = %command, code, "Command finished");

        Ok(code)
    }
}
