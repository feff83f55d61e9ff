//! SSH client tool invocations.
//!
//! Builds the `ssh`, `ssh-keygen`, `ssh-copy-id` and `sshfs` command lines
//! and checks that the tools are installed.

use std::borrow::Cow;

use shell_escape::unix::escape;

use crate::domain::{AppError, MountRequest, Result};

use super::runner::{CommandRunner, ExternalCommand};

/// Client binaries the tool shells out to.
pub const REQUIRED_TOOLS: &[&str] = &["ssh", "ssh-keygen", "sshfs", "ssh-copy-id"];

/// Expand a leading `~` or `~/` against the home directory.
#[must_use]
pub fn expand_home(path: &str) -> String {
    let rest = match path {
        "~" => "",
        p => match p.strip_prefix("~/") {
            Some(rest) => rest,
            None => return path.to_string(),
        },
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home.display().to_string(),
        Some(home) => home.join(rest).display().to_string(),
        None => path.to_string(),
    }
}

/// Fail with `MissingTool` for the first required tool not on the PATH.
///
/// # Errors
/// Returns error if a tool is missing or `which` cannot be started.
pub fn ensure_tools_installed(runner: &dyn CommandRunner) -> Result<()> {
    for tool in REQUIRED_TOOLS {
        let found = runner.probe(&ExternalCommand::new("which").arg(*tool).silent())?;
        if !found {
            return Err(AppError::MissingTool {
                tool: (*tool).to_string(),
            });
        }
    }
    Ok(())
}

/// Non-interactive login that exits immediately.
#[must_use]
pub fn connection_test(request: &MountRequest) -> ExternalCommand {
    let cmd = ExternalCommand::new("ssh").args(["-o", "BatchMode=yes"]);
    let cmd = match &request.key_path {
        Some(key) => cmd.args(["-i".to_string(), expand_home(key)]),
        None => cmd,
    };
    cmd.args([request.destination(), "exit".to_string()])
}

/// `sshfs` invocation mounting the request's remote path.
#[must_use]
pub fn sshfs_mount(request: &MountRequest) -> ExternalCommand {
    let cmd = ExternalCommand::new("sshfs");
    let cmd = match &request.key_path {
        Some(key) => cmd.args([
            "-o".to_string(),
            format!("IdentityFile={}", expand_home(key)),
        ]),
        None => cmd,
    };
    cmd.args([request.remote_device(), expand_home(&request.local_path)])
}

/// Generate a passphrase-less key pair at `key_path`.
#[must_use]
pub fn keygen(key_path: &str) -> ExternalCommand {
    let key = expand_home(key_path);
    ExternalCommand::new("ssh-keygen").args(["-f", key.as_str(), "-q", "-P", ""])
}

/// Install the public half of `key_path` for `destination`.
#[must_use]
pub fn copy_id(key_path: &str, destination: &str) -> ExternalCommand {
    ExternalCommand::new("ssh-copy-id").args([
        "-i".to_string(),
        format!("{}.pub", expand_home(key_path)),
        destination.to_string(),
    ])
}

/// Create `username` with `password` on `host`, logged in as `admin`.
///
/// Non-root admins go through `sudo`.
#[must_use]
pub fn create_user(admin: &str, host: &str, username: &str, password: &str) -> ExternalCommand {
    let sudo = if admin == "root" { "" } else { "sudo " };
    let user = escape(Cow::Borrowed(username));
    let credentials = escape(Cow::Owned(format!("{username}:{password}")));
    let script = format!(
        "{sudo}useradd -m {user} && printf '%s\\n' {credentials} | {sudo}chpasswd && exit"
    );

    ExternalCommand::new("ssh")
        .args([format!("{admin}@{host}"), script])
        .redact(credentials)
}
