//! Configuration file management.
//!
//! Handles loading the TOML configuration file and writing the default one.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# ssh-mounter configuration
# Auto-generated - edit as needed

[ssh]
# Identity file used when -k is given without a value
default_key_path = "~/.ssh/id_rsa"

# Admin account offered when creating a remote user
default_admin = "root"

[service]
# Directory unit files are installed to
unit_dir = "/etc/systemd/system"

# Automount period in seconds when -p is given without a value
period_secs = 60

# Targets the unit starts after
start_after = ["network.target", "auditd.service"]

# Restart the unit whenever it exits
restart_always = true

[logging]
# Log file used when -l is given without a value
default_log_path = "/var/log/ssh_mounter.log"

[mount]
# Kernel mount table to inspect
table_path = "/proc/mounts"
"#;

/// Load configuration from `path`, or the default location when `None`.
///
/// A missing file yields the defaults.
///
/// # Errors
/// Returns error if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config_path = path.map_or_else(AppConfig::default_config_path, Path::to_path_buf);

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        tracing::debug!(path = %config_path.display(), "No config file, using defaults");
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file {}: {e}", path.display()),
    })
}

/// Create the default configuration file if it doesn't exist.
///
/// Returns the path and whether a file was written.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(path: Option<&Path>) -> Result<(PathBuf, bool)> {
    let config_path = path.map_or_else(AppConfig::default_config_path, Path::to_path_buf);

    if config_path.exists() {
        return Ok((config_path, false));
    }

    // Ensure parent directory exists
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok((config_path, true))
}
