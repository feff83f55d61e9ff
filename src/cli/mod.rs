//! CLI interface using clap.
//!
//! Provides the flag surface of the tool. Values are validated later by the
//! application layer so that interactive mode can re-prompt for them.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::application::RequestInput;

/// ssh-mounter - mount a remote path over sshfs and keep it mounted.
///
/// Missing or invalid values are prompted for unless `-q` is given.
#[derive(Parser, Debug)]
#[command(name = "ssh-mounter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Remote username.
    #[arg(short, long)]
    pub username: Option<String>,

    /// Remote host name or IPv4 address.
    #[arg(short, long)]
    pub servername: Option<String>,

    /// Remote path to mount.
    #[arg(short, long)]
    pub remote_path: Option<String>,

    /// Local mount point.
    #[arg(short = 'm', long)]
    pub local_path: Option<String>,

    /// SSH identity file (bare flag uses the configured default).
    #[arg(short = 'k', long, value_name = "PATH", num_args = 0..=1)]
    pub ssh_key_path: Option<Option<String>>,

    /// Also log to a file (bare flag uses the configured default).
    #[arg(short, long, value_name = "PATH", num_args = 0..=1)]
    pub log_path: Option<Option<String>>,

    /// Create the remote user with this password.
    #[arg(short, long, value_name = "PASSWORD")]
    pub create_remote: Option<String>,

    /// Never prompt; every invalid or missing value is fatal.
    #[arg(short, long)]
    pub quiet_mode: bool,

    /// Install and start the periodic automount service.
    #[arg(short, long)]
    pub install_service: bool,

    /// Stop, disable and delete the automount service.
    #[arg(short, long)]
    pub delete_service: bool,

    /// Automount period in seconds (bare flag uses the configured default).
    #[arg(short, long, value_name = "SECS", num_args = 0..=1)]
    pub period: Option<Option<String>>,

    /// Print the automount service state.
    #[arg(long)]
    pub service_status: bool,

    /// Print the rendered service unit without installing it.
    #[arg(long)]
    pub print_service: bool,

    /// Write the default configuration file and exit.
    #[arg(long)]
    pub init_config: bool,

    /// Configuration file (defaults to ~/.config/ssh-mounter/config.toml).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Raw request values for the application layer.
    #[must_use]
    pub fn request_input(&self) -> RequestInput {
        RequestInput {
            username: self.username.clone(),
            host: self.servername.clone(),
            remote_path: self.remote_path.clone(),
            local_path: self.local_path.clone(),
            key_path: self.ssh_key_path.clone(),
            create_remote: self.create_remote.clone(),
            period: self.period.clone(),
            quiet: self.quiet_mode,
            install_service: self.install_service,
            delete_service: self.delete_service,
        }
    }

    /// Requested log file, with a bare `-l` resolved to `default`.
    #[must_use]
    pub fn log_path_or(&self, default: &Path) -> Option<String> {
        self.log_path
            .as_ref()
            .map(|path| path.clone().unwrap_or_else(|| default.display().to_string()))
    }
}
