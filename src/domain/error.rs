//! Domain-level error types for ssh-mounter.
//!
//! All errors are typed with `thiserror` and carry a human-readable message;
//! `main` logs them once and exits non-zero.

use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// User-supplied value does not match the required pattern.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Local I/O failed (mount table, unit file, log file, directories).
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// An external program exited with a non-zero status.
    #[error("Command `{command}` failed with exit code {code}")]
    CommandFailed { command: String, code: i32 },

    /// A required client binary is not on the PATH.
    #[error("{tool} is not installed. Please install it first, e.g. `apt install {tool}`")]
    MissingTool { tool: String },

    /// The non-interactive SSH login test failed.
    #[error(
        "Could not connect to {destination} over SSH. \
         Check the connection or set up a key pair for the remote server"
    )]
    Connection { destination: String },

    /// The local mount point is occupied by a different device.
    #[error("{device} already mounted to {mount_point}")]
    MountBusy { device: String, mount_point: String },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The user declined a required step or input ended.
    #[error("Aborted: {message}")]
    Aborted { message: String },
}

impl AppError {
    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Create a validation error for a named field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an aborted error.
    pub fn aborted(message: impl Into<String>) -> Self {
        Self::Aborted {
            message: message.into(),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
