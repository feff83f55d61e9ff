//! Mount orchestration.
//!
//! Runs the one-shot mount flow (mount check, local directory, remote user,
//! key setup, connection test, sshfs) and the single tick used by the
//! periodic automount task.

use std::fs;
use std::path::Path;

use crate::domain::validate::{validate_path, validate_username};
use crate::domain::{AppConfig, AppError, MountRequest, MountStatus, Result};
use crate::infrastructure::mount_table::MountResolver;
use crate::infrastructure::prompt::{ask_until_valid, confirm, Prompt};
use crate::infrastructure::runner::CommandRunner;
use crate::infrastructure::ssh::{self, expand_home};

/// Minimum length accepted for a new remote user's password.
const MIN_PASSWORD_LEN: usize = 5;

/// What the one-shot flow ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// sshfs mounted the remote path.
    Mounted,
    /// The expected device was already mounted.
    AlreadyMounted,
}

/// Mount use cases over injected runner, prompt and resolver.
pub struct Mounter<'a> {
    runner: &'a dyn CommandRunner,
    prompt: &'a dyn Prompt,
    resolver: &'a MountResolver,
    config: &'a AppConfig,
}

impl<'a> Mounter<'a> {
    /// Create a mounter.
    #[must_use]
    pub const fn new(
        runner: &'a dyn CommandRunner,
        prompt: &'a dyn Prompt,
        resolver: &'a MountResolver,
        config: &'a AppConfig,
    ) -> Self {
        Self {
            runner,
            prompt,
            resolver,
            config,
        }
    }

    /// Whether the expected device is mounted at the local path.
    ///
    /// # Errors
    /// Returns `MountBusy` if another device occupies the mount point, or an
    /// I/O error if the mount table cannot be read.
    pub fn check_mounted(&self, request: &MountRequest) -> Result<bool> {
        match self.resolver.resolve(&request.mount_query())? {
            MountStatus::NotMounted => Ok(false),
            MountStatus::AlreadyMountedAsExpected => Ok(true),
            MountStatus::BusyWithOther { device } => Err(AppError::MountBusy {
                device,
                mount_point: request.local_path.clone(),
            }),
        }
    }

    /// Make sure the local mount point exists, offering to create it.
    ///
    /// # Errors
    /// Returns error if the directory is missing and was not created.
    pub fn ensure_local_dir(&self, request: &MountRequest) -> Result<()> {
        let local = expand_home(&request.local_path);
        let path = Path::new(&local);

        if !path.exists() && !request.quiet {
            let create = confirm(
                self.prompt,
                &format!(
                    "Directory '{}' does not exist. Would you like to create it? (yes/no): ",
                    request.local_path
                ),
                false,
            )?;

            if create {
                fs::create_dir_all(path).map_err(|e| {
                    AppError::io(format!("Failed to create directory '{local}'"), e)
                })?;
                tracing::info!("Directory '{local}' created successfully!");
            }
        }

        if !path.exists() {
            return Err(AppError::aborted(format!(
                "Local mount directory '{}' was not created",
                request.local_path
            )));
        }

        Ok(())
    }

    /// Create the remote user named in the request through an admin account.
    ///
    /// # Errors
    /// Returns error if input fails or the remote command fails.
    pub fn create_remote_user(&self, request: &MountRequest) -> Result<()> {
        let Some(given) = request.create_remote.as_deref() else {
            return Ok(());
        };

        let default_admin = &self.config.ssh.default_admin;
        let admin = ask_until_valid(
            self.prompt,
            &format!("Input remote admin username (default: {default_admin}): "),
            Some(default_admin.as_str()),
            |value| validate_username(value).map(|()| value.to_string()),
        )?;

        let mut password = given.to_string();
        while password.chars().count() < MIN_PASSWORD_LEN {
            let message = format!(
                "Input remote user {} password, length > {}: ",
                request.username,
                MIN_PASSWORD_LEN - 1
            );
            password = self.prompt.ask_secret(&message)?;
            if password.chars().count() < MIN_PASSWORD_LEN {
                self.prompt.notice(&format!(
                    "The password must be at least {MIN_PASSWORD_LEN} characters long"
                ));
            }
        }

        self.runner.run_checked(&ssh::create_user(
            &admin,
            &request.host,
            &request.username,
            &password,
        ))?;

        tracing::info!(
            "User {} successfully created at {}",
            request.username,
            request.host
        );

        Ok(())
    }

    /// Choose an identity file interactively, creating one when missing.
    ///
    /// Quiet requests without a key keep using ssh's default identities.
    ///
    /// # Errors
    /// Returns error if input fails or key creation fails.
    pub fn select_key(&self, request: &mut MountRequest) -> Result<()> {
        if request.key_path.is_some() || request.quiet {
            return Ok(());
        }

        let default_key = &self.config.ssh.default_key_path;
        let key = ask_until_valid(
            self.prompt,
            &format!(
                "Enter local SSH key file path. It is created if it does not exist \
                 (e.g. ~/.ssh/{}, default: {default_key}): ",
                request.username
            ),
            Some(default_key.as_str()),
            |value| validate_path("SSH key path", value).map(|()| value.to_string()),
        )?;

        let exists = Path::new(&expand_home(&key)).exists();
        request.key_path = Some(key);

        if !exists {
            tracing::info!(
                "Local SSH key file {} does not exist",
                request.key_path.as_deref().unwrap_or_default()
            );
            self.create_and_install_key(request)?;
        }

        Ok(())
    }

    /// Generate a key pair and install its public half on the server.
    ///
    /// # Errors
    /// Returns error if the user declines or either command fails.
    pub fn create_and_install_key(&self, request: &mut MountRequest) -> Result<()> {
        let create = confirm(
            self.prompt,
            "Would you like to create a local SSH keyfile to connect without a password? \
             (yes/no, default yes): ",
            true,
        )?;
        if !create {
            return Err(AppError::aborted(
                "create and set up a key pair to connect to the remote server without a password",
            ));
        }

        let default_key = request
            .key_path
            .clone()
            .unwrap_or_else(|| self.config.ssh.default_key_path.clone());
        let key = ask_until_valid(
            self.prompt,
            &format!(
                "Input key path and name (e.g. ~/.ssh/{}, default: {default_key}): ",
                request.username
            ),
            Some(default_key.as_str()),
            |value| validate_path("SSH key path", value).map(|()| value.to_string()),
        )?;

        self.runner.run_checked(&ssh::keygen(&key))?;
        tracing::info!("Created keyfile at {key}");

        self.runner
            .run_checked(&ssh::copy_id(&key, &request.destination()))?;
        tracing::info!("Installed {key}.pub to {}", request.destination());

        request.key_path = Some(key);
        Ok(())
    }

    /// Make sure a non-interactive SSH login works.
    ///
    /// Interactive requests get one chance to set up a key pair.
    ///
    /// # Errors
    /// Returns `Connection` if the login still fails.
    pub fn ensure_connection(&self, request: &mut MountRequest) -> Result<()> {
        if self.runner.probe(&ssh::connection_test(request))? {
            return Ok(());
        }

        if !request.quiet {
            tracing::warn!("SSH login to {} failed", request.destination());
            self.create_and_install_key(request)?;
            if self.runner.probe(&ssh::connection_test(request))? {
                return Ok(());
            }
        }

        Err(AppError::Connection {
            destination: request.destination(),
        })
    }

    /// Run sshfs for the request.
    ///
    /// # Errors
    /// Returns error if sshfs fails.
    pub fn mount(&self, request: &MountRequest) -> Result<()> {
        self.runner.run_checked(&ssh::sshfs_mount(request))?;
        tracing::info!(
            "Mounted {} to {}",
            request.remote_device(),
            request.local_path
        );
        Ok(())
    }

    /// The full one-shot flow.
    ///
    /// # Errors
    /// Returns the first fatal error of any step.
    pub fn run(&self, request: &mut MountRequest) -> Result<MountOutcome> {
        if self.check_mounted(request)? {
            return Ok(MountOutcome::AlreadyMounted);
        }

        self.ensure_local_dir(request)?;
        self.create_remote_user(request)?;
        self.select_key(request)?;
        self.ensure_connection(request)?;

        if self.check_mounted(request)? {
            return Ok(MountOutcome::AlreadyMounted);
        }

        self.mount(request)?;
        Ok(MountOutcome::Mounted)
    }

    /// One automount tick: mount when nothing is mounted.
    ///
    /// # Errors
    /// Returns error if the mount point is busy or sshfs fails.
    pub fn tick(&self, request: &MountRequest) -> Result<()> {
        if self.check_mounted(request)? {
            tracing::debug!("{} still mounted", request.local_path);
            return Ok(());
        }
        self.mount(request)
    }
}
