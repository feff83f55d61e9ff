//! Systemd unit models.
//!
//! Rendering is pure and byte-exact; installing the rendered text is the job
//! of `infrastructure::systemd`.

use std::fmt::Write as _;

/// Suffix appended to every generated service name.
pub const SERVICE_SUFFIX: &str = "@ssh-mounter";

/// Attributes needed to render a service unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUnitSpec {
    /// Unit name without the `.service` extension.
    pub service_name: String,
    /// Absolute executable path followed by its arguments.
    pub command_line: String,
    /// Free-text description.
    pub description: String,
    /// Targets the unit is ordered after.
    pub start_after: Vec<String>,
    /// Whether systemd restarts the service whenever it exits.
    pub restart_always: bool,
}

impl ServiceUnitSpec {
    /// Unit file name, e.g. `home-user@ssh-mounter.service`.
    #[must_use]
    pub fn file_name(&self) -> String {
        unit_file_name(&self.service_name)
    }

    /// Render the unit file text.
    #[must_use]
    pub fn render(&self) -> String {
        let restart_line = if self.restart_always {
            "Restart=always"
        } else {
            ""
        };

        format!(
            "[Unit]
Description={description}
After={after}

[Service]
ExecStart={command}
Type=simple
{restart_line}

[Install]
WantedBy=multi-user.target
Alias={name}.service
",
            description = self.description,
            after = self.start_after.join(" "),
            command = self.command_line,
            name = self.service_name,
        )
    }
}

/// Unit file name for a service name.
#[must_use]
pub fn unit_file_name(service_name: &str) -> String {
    format!("{service_name}.service")
}

/// Derive the service name for a remote path.
///
/// Slashes become `-`; anything else outside `[A-Za-z0-9_.:]` (including a
/// literal `-`) is escaped as `\xNN`, so distinct paths never share a name.
/// Relative paths start with `:`, which absolute paths always escape.
#[must_use]
pub fn service_name_for(remote_path: &str) -> String {
    let trimmed = remote_path.trim();
    let (path, relative) = match trimmed.strip_prefix('/') {
        Some(rest) => (rest.trim_end_matches('/'), false),
        None => (trimmed.trim_end_matches('/'), true),
    };

    let mut name = String::with_capacity(path.len() + SERVICE_SUFFIX.len() + 1);
    if relative {
        name.push(':');
    } else if path.is_empty() {
        name.push('-');
    }

    for (i, byte) in path.bytes().enumerate() {
        match byte {
            b'/' => name.push('-'),
            b'.' | b':' if i == 0 => {
                let _ = write!(name, "\\x{byte:02x}");
            }
            b if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b':') => {
                name.push(char::from(b));
            }
            b => {
                let _ = write!(name, "\\x{b:02x}");
            }
        }
    }

    name.push_str(SERVICE_SUFFIX);
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_spec(restart_always: bool) -> ServiceUnitSpec {
        ServiceUnitSpec {
            service_name: "home-user@ssh-mounter".into(),
            command_line: "/usr/local/bin/ssh-mounter -u bob -q".into(),
            description: "Mount remote path /home/user to local /mnt/x".into(),
            start_after: vec!["network.target".into(), "auditd.service".into()],
            restart_always,
        }
    }

    #[test]
    fn test_render_is_byte_exact() {
        let expected = "[Unit]
Description=Mount remote path /home/user to local /mnt/x
After=network.target auditd.service

[Service]
ExecStart=/usr/local/bin/ssh-mounter -u bob -q
Type=simple
Restart=always

[Install]
WantedBy=multi-user.target
Alias=home-user@ssh-mounter.service
";
        assert_eq!(example_spec(true).render(), expected);
    }

    #[test]
    fn test_render_keeps_blank_restart_line() {
        let rendered = example_spec(false).render();
        assert!(rendered.contains("Type=simple\n\n\n[Install]"));
        assert!(!rendered.contains("Restart="));
    }

    #[test]
    fn test_render_is_deterministic_with_ordered_sections() {
        let spec = example_spec(true);
        let first = spec.render();
        assert_eq!(first, spec.render());

        for section in ["[Unit]", "[Service]", "[Install]"] {
            assert_eq!(first.matches(section).count(), 1, "{section}");
        }
        let unit = first.find("[Unit]").unwrap();
        let service = first.find("[Service]").unwrap();
        let install = first.find("[Install]").unwrap();
        assert!(unit < service && service < install);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(example_spec(true).file_name(), "home-user@ssh-mounter.service");
    }

    #[test]
    fn test_service_name_from_remote_path() {
        assert_eq!(service_name_for("/home/user"), "home-user@ssh-mounter");
        assert_eq!(service_name_for("/home/user/"), "home-user@ssh-mounter");
        assert_eq!(service_name_for("data/backups"), ":data-backups@ssh-mounter");
        assert_eq!(service_name_for("/"), "-@ssh-mounter");
    }

    #[test]
    fn test_service_name_escapes_ambiguous_characters() {
        assert_eq!(service_name_for("/a-b"), "a\\x2db@ssh-mounter");
        assert_ne!(service_name_for("/a-b"), service_name_for("/a/b"));
        assert_eq!(service_name_for("~/docs"), ":\\x7e-docs@ssh-mounter");
        assert_eq!(service_name_for("/.hidden"), "\\x2ehidden@ssh-mounter");
        assert_eq!(service_name_for("/srv/v1.2"), "srv-v1.2@ssh-mounter");
    }

    #[test]
    fn test_relative_and_absolute_paths_get_distinct_names() {
        assert_ne!(service_name_for("home/user"), service_name_for("/home/user"));
        assert_ne!(service_name_for("~/docs"), service_name_for("/~/docs"));
        assert_ne!(service_name_for("./x"), service_name_for("/./x"));
        assert_ne!(service_name_for(":x"), service_name_for("/:x"));
        assert_eq!(service_name_for("/:x"), "\\x3ax@ssh-mounter");
    }
}
