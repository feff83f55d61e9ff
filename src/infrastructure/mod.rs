//! Infrastructure layer - external system integrations.
//!
//! Contains the command runner, terminal prompts, mount table access,
//! ssh/sshfs command builders, systemd integration and config files.

pub mod config;
pub mod mount_table;
pub mod prompt;
pub mod runner;
pub mod ssh;
pub mod systemd;

#[cfg(test)]
pub mod testing;

pub use config::{ensure_config_exists, load_config};
pub use mount_table::MountResolver;
pub use prompt::TerminalPrompt;
pub use runner::SystemRunner;
pub use systemd::{CommandCheck, InstallOutcome, RemoveOutcome, ServiceInstaller};
