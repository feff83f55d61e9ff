//! Input validation rules for user-supplied values.
//!
//! Each check returns `AppError::Validation` naming the offending field, so
//! interactive callers can re-prompt and quiet callers can fail.

use crate::domain::{AppError, Result};

/// Characters allowed inside a path segment.
fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Whether `rest` is one or more segments separated by single slashes,
/// optionally ending in a slash.
fn is_segment_list(rest: &str) -> bool {
    rest.chars().next().is_some_and(is_segment_char)
        && !rest.contains("//")
        && rest.chars().all(|c| c == '/' || is_segment_char(c))
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AppError::validation(field, "value must not be empty"));
    }
    Ok(())
}

/// Validate a remote username.
pub fn validate_username(value: &str) -> Result<()> {
    require_non_empty("username", value)?;

    if value.starts_with('-') || !value.chars().all(is_segment_char) {
        return Err(AppError::validation(
            "username",
            format!("'{value}' may only contain letters, digits, '.', '_' and '-'"),
        ));
    }

    Ok(())
}

fn is_ipv4(value: &str) -> bool {
    let octets: Vec<&str> = value.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|o| {
            (1..=3).contains(&o.len())
                && o.chars().all(|c| c.is_ascii_digit())
                && o.parse::<u16>().is_ok_and(|n| n <= 255)
        })
}

fn is_host_label(label: &str) -> bool {
    (1..=63).contains(&label.len())
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_hostname(value: &str) -> bool {
    let name = value.strip_suffix('.').unwrap_or(value);
    let labels: Vec<&str> = name.split('.').collect();

    match labels.as_slice() {
        [single] => is_host_label(single),
        [domain @ .., tld] => {
            domain.iter().all(|l| is_host_label(l))
                && (2..=6).contains(&tld.len())
                && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        [] => false,
    }
}

/// Validate a remote host name or dotted IPv4 address.
pub fn validate_host(value: &str) -> Result<()> {
    require_non_empty("host", value)?;

    if is_ipv4(value) || is_hostname(value) {
        Ok(())
    } else {
        Err(AppError::validation(
            "host",
            format!("'{value}' is not a host name or IPv4 address"),
        ))
    }
}

/// Whether a value looks like a relative, home-relative or absolute path.
#[must_use]
pub fn is_valid_path(value: &str) -> bool {
    [
        value.strip_prefix("~/"),
        value.strip_prefix('~'),
        value.strip_prefix('/'),
        value.strip_prefix("./"),
        Some(value),
    ]
    .into_iter()
    .flatten()
    .any(is_segment_list)
}

/// Validate a local or remote path, naming it `field` in errors.
pub fn validate_path(field: &str, value: &str) -> Result<()> {
    require_non_empty(field, value)?;

    if is_valid_path(value) {
        Ok(())
    } else {
        Err(AppError::validation(field, format!("'{value}' is not a valid path")))
    }
}

/// Validate that a command line starts with an absolute executable path.
pub fn validate_command_line(value: &str) -> Result<()> {
    let program = value.split(' ').next().unwrap_or_default();

    match program.strip_prefix('/') {
        Some(rest) if is_segment_list(rest) => Ok(()),
        _ => Err(AppError::validation(
            "command line",
            format!(
                "'{value}' must start with an absolute path, \
                 e.g. \"/usr/local/bin/ssh-mounter arg1 arg2\""
            ),
        )),
    }
}

/// Parse an automount period in seconds.
pub fn parse_period(value: &str) -> Result<u64> {
    let invalid = || {
        AppError::validation(
            "period",
            format!("'{value}' is not a positive number of seconds"),
        )
    };

    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(invalid()),
    }
}
