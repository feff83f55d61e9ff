//! Systemd service integration.
//!
//! Installs, starts, inspects and removes a rendered service unit. The unit
//! file on disk is the only record of "installed"; the service manager is
//! synchronized with reload/enable/disable after every change to it.

use std::fs;
use std::path::PathBuf;

use crate::domain::validate::validate_command_line;
use crate::domain::{unit_file_name, AppError, Result, ServiceUnitSpec};

use super::prompt::{ask_until_valid, Prompt};
use super::runner::{CommandRunner, ExternalCommand};

/// How `prepare` treats the unit's command line.
#[derive(Clone, Copy)]
pub enum CommandCheck<'a> {
    /// Render without validating.
    Skip,
    /// A command line without an absolute executable path is fatal.
    Strict,
    /// Ask for a replacement until a valid command line is entered.
    Interactive(&'a dyn Prompt),
}

/// Result of installing a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Unit file written, daemon reloaded, enable attempted.
    Installed { path: PathBuf },
    /// A unit file already existed; nothing was touched.
    AlreadyExists { path: PathBuf },
}

/// Result of removing a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Unit stopped, disabled, deleted and daemon reloaded.
    Removed { path: PathBuf },
    /// No unit file existed; nothing was touched.
    NotInstalled { path: PathBuf },
}

/// Observed state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// No unit file.
    Absent,
    /// Unit file present, service not running.
    Installed { enabled: bool },
    /// Unit file present, service active.
    Running { enabled: bool },
}

impl UnitState {
    /// Get a short status string.
    #[must_use]
    pub const fn short_status(&self) -> &'static str {
        match self {
            Self::Absent => "not installed",
            Self::Installed { enabled: false } => "installed, disabled",
            Self::Installed { enabled: true } => "enabled, stopped",
            Self::Running { enabled: false } => "running (not enabled)",
            Self::Running { enabled: true } => "running",
        }
    }
}

fn systemctl<'s>(args: impl IntoIterator<Item = &'s str>) -> ExternalCommand {
    ExternalCommand::new("systemctl").args(args)
}

/// Systemd unit installer.
pub struct ServiceInstaller<'a> {
    runner: &'a dyn CommandRunner,
    unit_dir: PathBuf,
}

impl<'a> ServiceInstaller<'a> {
    /// Create an installer writing unit files to `unit_dir`.
    #[must_use]
    pub fn new(runner: &'a dyn CommandRunner, unit_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            unit_dir: unit_dir.into(),
        }
    }

    /// Path of the unit file for `service_name`.
    #[must_use]
    pub fn unit_path(&self, service_name: &str) -> PathBuf {
        self.unit_dir.join(unit_file_name(service_name))
    }

    /// Render `spec`, validating its command line according to `check`.
    ///
    /// # Errors
    /// Returns a validation error in strict mode, or a prompt error.
    pub fn prepare(&self, spec: &ServiceUnitSpec, check: CommandCheck<'_>) -> Result<String> {
        match check {
            CommandCheck::Skip => Ok(spec.render()),
            CommandCheck::Strict => {
                validate_command_line(&spec.command_line)?;
                Ok(spec.render())
            }
            CommandCheck::Interactive(prompt) => {
                if let Err(e) = validate_command_line(&spec.command_line) {
                    tracing::error!("{e}");
                    let command_line = ask_until_valid(
                        prompt,
                        "Please input a valid command line, e.g. \"/root/.local/bin/ssh-mounter arg1 arg2\": ",
                        None,
                        |answer| validate_command_line(answer).map(|()| answer.to_string()),
                    )?;

                    return Ok(ServiceUnitSpec {
                        command_line,
                        ..spec.clone()
                    }
                    .render());
                }
                Ok(spec.render())
            }
        }
    }

    /// Install a rendered unit, refusing to overwrite an existing one.
    ///
    /// # Errors
    /// Returns error if the file cannot be written or the daemon reload fails.
    pub fn install(&self, service_name: &str, content: &str) -> Result<InstallOutcome> {
        let path = self.unit_path(service_name);
        if path.exists() {
            tracing::error!(path = %path.display(), "Unit file already exists");
            return Ok(InstallOutcome::AlreadyExists { path });
        }

        tracing::info!(path = %path.display(), "Writing unit file...");
        fs::write(&path, content).map_err(|e| {
            AppError::io(format!("Failed to write unit file {}", path.display()), e)
        })?;

        self.daemon_reload()?;

        let file_name = unit_file_name(service_name);
        tracing::info!("Enable {file_name}...");
        if let Err(e) = self.runner.run_checked(&systemctl(["enable", file_name.as_str()])) {
            tracing::warn!("{e}");
        }

        Ok(InstallOutcome::Installed { path })
    }

    /// Start an installed unit.
    ///
    /// # Errors
    /// Returns error if `systemctl start` fails.
    pub fn start(&self, service_name: &str) -> Result<()> {
        let file_name = unit_file_name(service_name);
        tracing::info!("Start {file_name}...");
        self.runner.run_checked(&systemctl(["start", file_name.as_str()]))
    }

    /// Stop, disable and delete a unit, then reload the daemon.
    ///
    /// # Errors
    /// Returns error if any step fails; later steps are not attempted.
    pub fn remove(&self, service_name: &str) -> Result<RemoveOutcome> {
        let path = self.unit_path(service_name);
        if !path.exists() {
            tracing::error!(path = %path.display(), "Unit file does not exist");
            return Ok(RemoveOutcome::NotInstalled { path });
        }

        let file_name = unit_file_name(service_name);
        tracing::info!("Stop {file_name}...");
        self.runner.run_checked(&systemctl(["stop", file_name.as_str()]))?;
        tracing::info!("Disable {file_name}...");
        self.runner.run_checked(&systemctl(["disable", file_name.as_str()]))?;

        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                AppError::io(format!("Failed to remove unit file {}", path.display()), e)
            })?;
        }

        self.daemon_reload()?;

        Ok(RemoveOutcome::Removed { path })
    }

    /// Observe the unit's current state.
    ///
    /// # Errors
    /// Returns error if `systemctl` cannot be started.
    pub fn status(&self, service_name: &str) -> Result<UnitState> {
        if !self.unit_path(service_name).exists() {
            return Ok(UnitState::Absent);
        }

        let file_name = unit_file_name(service_name);
        let enabled = self
            .runner
            .probe(&systemctl(["is-enabled", "--quiet", file_name.as_str()]).silent())?;
        let running = self
            .runner
            .probe(&systemctl(["is-active", "--quiet", file_name.as_str()]).silent())?;

        Ok(if running {
            UnitState::Running { enabled }
        } else {
            UnitState::Installed { enabled }
        })
    }

    fn daemon_reload(&self) -> Result<()> {
        tracing::info!("Reload systemd daemon...");
        self.runner.run_checked(&systemctl(["daemon-reload"]))
    }
}
