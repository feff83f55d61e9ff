//! Request resolution.
//!
//! Turns raw command-line values into a validated `MountRequest`, prompting
//! for missing or invalid values in interactive mode and failing in quiet mode.

use std::path::PathBuf;

use crate::domain::validate::{
    parse_period, validate_host, validate_path, validate_username,
};
use crate::domain::{AppConfig, AppError, MountRequest, Result};
use crate::infrastructure::prompt::{ask_until_valid, Prompt};
use crate::infrastructure::ssh::expand_home;

/// Raw values as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct RequestInput {
    pub username: Option<String>,
    pub host: Option<String>,
    pub remote_path: Option<String>,
    pub local_path: Option<String>,
    /// `Some(None)` when the flag was given without a value.
    pub key_path: Option<Option<String>>,
    pub create_remote: Option<String>,
    /// `Some(None)` when the flag was given without a value.
    pub period: Option<Option<String>>,
    pub quiet: bool,
    pub install_service: bool,
    pub delete_service: bool,
}

/// Resolves one field: validates a given value, prompts when interactive.
struct FieldResolver<'a> {
    prompt: &'a dyn Prompt,
    quiet: bool,
}

impl FieldResolver<'_> {
    fn resolve<T>(
        &self,
        given: Option<&str>,
        field: &str,
        message: &str,
        default: Option<&str>,
        parse: impl Fn(&str) -> Result<T>,
    ) -> Result<T> {
        match given {
            Some(value) => match parse(value) {
                Ok(parsed) => Ok(parsed),
                Err(e @ AppError::Validation { .. }) if !self.quiet => {
                    self.prompt.notice(&e.to_string());
                    ask_until_valid(self.prompt, message, default, parse)
                }
                Err(e) => Err(e),
            },
            None if self.quiet => Err(AppError::validation(
                field,
                "a value is required in quiet mode",
            )),
            None => ask_until_valid(self.prompt, message, default, parse),
        }
    }
}

fn owned(validate: fn(&str) -> Result<()>) -> impl Fn(&str) -> Result<String> {
    move |value| validate(value).map(|()| value.to_string())
}

fn owned_path(field: &'static str) -> impl Fn(&str) -> Result<String> {
    move |value| validate_path(field, value).map(|()| value.to_string())
}

/// Validate and complete the raw input.
///
/// # Errors
/// Returns a validation error for conflicting flags, or for invalid or
/// missing values in quiet mode; returns prompt errors in interactive mode.
pub fn resolve_request(
    input: RequestInput,
    config: &AppConfig,
    log_path: Option<PathBuf>,
    prompt: &dyn Prompt,
) -> Result<MountRequest> {
    if input.install_service && input.delete_service {
        return Err(AppError::validation(
            "service flags",
            "-i and -d cannot be used together",
        ));
    }

    if input.quiet && input.create_remote.is_some() {
        return Err(AppError::validation(
            "mode flags",
            "-c creates a user interactively and cannot be used with -q",
        ));
    }

    let fields = FieldResolver {
        prompt,
        quiet: input.quiet,
    };

    let default_period = config.service.period_secs.to_string();
    let period_secs = match &input.period {
        None => None,
        Some(None) => Some(config.service.period_secs),
        Some(Some(value)) => Some(fields.resolve(
            Some(value.as_str()),
            "period",
            "Enter a correct period in seconds, e.g. 60: ",
            Some(default_period.as_str()),
            parse_period,
        )?),
    };

    let username = fields.resolve(
        input.username.as_deref(),
        "username",
        "Enter remote username: ",
        None,
        owned(validate_username),
    )?;

    let host = fields.resolve(
        input.host.as_deref(),
        "host",
        "Enter remote host (e.g. cloud.server.com or 192.168.0.20): ",
        None,
        owned(validate_host),
    )?;

    let remote_path = fields.resolve(
        input.remote_path.as_deref(),
        "remote path",
        &format!("Enter remote path (e.g. /home/{username}): "),
        None,
        owned_path("remote path"),
    )?;

    let local_path = fields.resolve(
        input.local_path.as_deref(),
        "local path",
        "Enter local mounting path (e.g. /mnt/keystore): ",
        None,
        owned_path("local path"),
    )?;

    let key_path = match input.key_path {
        None => None,
        Some(None) => Some(config.ssh.default_key_path.clone()),
        Some(Some(value)) => Some(fields.resolve(
            Some(value.as_str()),
            "SSH key path",
            "Enter local SSH key file path: ",
            Some(config.ssh.default_key_path.as_str()),
            owned_path("SSH key path"),
        )?),
    };

    Ok(MountRequest {
        username,
        host,
        remote_path,
        local_path: expand_home(&local_path),
        key_path,
        quiet: input.quiet,
        create_remote: input.create_remote,
        log_path,
        period_secs,
    })
}
