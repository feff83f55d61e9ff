//! Configuration model.
//!
//! Every value has a default, so a missing or partial config file is fine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// SSH client defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshConfig {
    /// Identity file used when `-k` is given without a value.
    #[serde(default = "default_key_path")]
    pub default_key_path: String,

    /// Admin account offered when creating a remote user.
    #[serde(default = "default_admin")]
    pub default_admin: String,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            default_key_path: default_key_path(),
            default_admin: default_admin(),
        }
    }
}

fn default_key_path() -> String {
    "~/.ssh/id_rsa".into()
}

fn default_admin() -> String {
    "root".into()
}

/// Service installation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directory unit files are written to.
    #[serde(default = "default_unit_dir")]
    pub unit_dir: PathBuf,

    /// Automount period in seconds when `-p` is given without a value.
    #[serde(default = "default_period")]
    pub period_secs: u64,

    /// Targets the unit is ordered after.
    #[serde(default = "default_start_after")]
    pub start_after: Vec<String>,

    /// Whether the unit restarts whenever it exits.
    #[serde(default = "default_restart_always")]
    pub restart_always: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            unit_dir: default_unit_dir(),
            period_secs: default_period(),
            start_after: default_start_after(),
            restart_always: default_restart_always(),
        }
    }
}

fn default_unit_dir() -> PathBuf {
    PathBuf::from("/etc/systemd/system")
}

const fn default_period() -> u64 {
    60
}

fn default_start_after() -> Vec<String> {
    vec!["network.target".into(), "auditd.service".into()]
}

const fn default_restart_always() -> bool {
    true
}

/// Log file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log file used when `-l` is given without a value.
    #[serde(default = "default_log_path")]
    pub default_log_path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_log_path: default_log_path(),
        }
    }
}

fn default_log_path() -> PathBuf {
    PathBuf::from("/var/log/ssh_mounter.log")
}

/// Mount table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    /// Kernel mount table to inspect.
    #[serde(default = "default_table_path")]
    pub table_path: PathBuf,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            table_path: default_table_path(),
        }
    }
}

fn default_table_path() -> PathBuf {
    PathBuf::from("/proc/mounts")
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// SSH client defaults.
    #[serde(default)]
    pub ssh: SshConfig,

    /// Service installation settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Log file settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Mount table settings.
    #[serde(default)]
    pub mount: MountConfig,
}

impl AppConfig {
    /// Get the default config file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ssh-mounter")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.service.period_secs, 60);
        assert_eq!(config.service.unit_dir, PathBuf::from("/etc/systemd/system"));
        assert_eq!(config.service.start_after, ["network.target", "auditd.service"]);
        assert!(config.service.restart_always);
        assert_eq!(config.ssh.default_admin, "root");
        assert_eq!(config.mount.table_path, PathBuf::from("/proc/mounts"));
    }

    #[test]
    fn test_config_path_ends_with_file_name() {
        assert!(AppConfig::default_config_path().ends_with("ssh-mounter/config.toml"));
    }
}
