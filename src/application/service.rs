//! Automount service use cases.
//!
//! Builds the unit that re-invokes this binary in quiet periodic mode and
//! drives the installer for install, remove and status.

use std::fmt::Write as _;
use std::path::Path;

use crate::domain::{service_name_for, AppConfig, MountRequest, Result, ServiceUnitSpec};
use crate::infrastructure::ssh::expand_home;
use crate::infrastructure::systemd::{
    CommandCheck, InstallOutcome, RemoveOutcome, ServiceInstaller, UnitState,
};

/// Build the unit spec for `request`, executing `executable`.
#[must_use]
pub fn unit_spec(request: &MountRequest, config: &AppConfig, executable: &Path) -> ServiceUnitSpec {
    let period = request.period_secs.unwrap_or(config.service.period_secs);

    let mut command_line = format!(
        "{} -u {} -s {} -r {} -m {} -p {period} -q",
        executable.display(),
        request.username,
        request.host,
        request.remote_path,
        request.local_path,
    );
    if let Some(key) = &request.key_path {
        let _ = write!(command_line, " -k {}", expand_home(key));
    }
    if let Some(log_path) = &request.log_path {
        let _ = write!(command_line, " -l {}", log_path.display());
    }

    ServiceUnitSpec {
        service_name: service_name_for(&request.remote_path),
        command_line,
        description: format!(
            "Mount remote path {} to local {}",
            request.remote_path, request.local_path
        ),
        start_after: config.service.start_after.clone(),
        restart_always: config.service.restart_always,
    }
}

/// Render, install and start the automount unit.
///
/// An already existing unit is reported and left alone.
///
/// # Errors
/// Returns error if rendering, writing, reloading or starting fails.
pub fn install_service(
    installer: &ServiceInstaller<'_>,
    spec: &ServiceUnitSpec,
    check: CommandCheck<'_>,
) -> Result<InstallOutcome> {
    tracing::info!("Prepare service...");
    let content = installer.prepare(spec, check)?;

    let outcome = installer.install(&spec.service_name, &content)?;
    if let InstallOutcome::Installed { .. } = outcome {
        tracing::info!("Service {} installed successfully", spec.file_name());
        installer.start(&spec.service_name)?;
    }

    Ok(outcome)
}

/// Stop and delete the automount unit for `request`.
///
/// # Errors
/// Returns error if any teardown step fails.
pub fn remove_service(
    installer: &ServiceInstaller<'_>,
    request: &MountRequest,
) -> Result<RemoveOutcome> {
    let service_name = service_name_for(&request.remote_path);
    let outcome = installer.remove(&service_name)?;

    if let RemoveOutcome::Removed { .. } = outcome {
        tracing::info!("Service {service_name}.service removed successfully");
    }

    Ok(outcome)
}

/// Observed state of the automount unit for `request`.
///
/// # Errors
/// Returns error if `systemctl` cannot be started.
pub fn service_status(
    installer: &ServiceInstaller<'_>,
    request: &MountRequest,
) -> Result<(String, UnitState)> {
    let service_name = service_name_for(&request.remote_path);
    let state = installer.status(&service_name)?;
    Ok((service_name, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    use crate::infrastructure::testing::RecordingRunner;
    use tempfile::tempdir;

    fn request() -> MountRequest {
        MountRequest {
            username: "bob".into(),
            host: "nas.local".into(),
            remote_path: "/home/user".into(),
            local_path: "/mnt/x".into(),
            key_path: Some("/keys/bob".into()),
            quiet: false,
            period_secs: Some(30),
            log_path: Some(PathBuf::from("/var/log/ssh_mounter.log")),
            ..Default::default()
        }
    }

    #[test]
    fn test_unit_spec_reinvokes_binary_quietly() {
        let spec = unit_spec(
            &request(),
            &AppConfig::default(),
            Path::new("/usr/local/bin/ssh-mounter"),
        );

        assert_eq!(spec.service_name, "home-user@ssh-mounter");
        assert_eq!(
            spec.command_line,
            "/usr/local/bin/ssh-mounter -u bob -s nas.local -r /home/user -m /mnt/x \
             -p 30 -q -k /keys/bob -l /var/log/ssh_mounter.log"
        );
        assert_eq!(spec.description, "Mount remote path /home/user to local /mnt/x");
        assert_eq!(spec.start_after, ["network.target", "auditd.service"]);
        assert!(spec.restart_always);
    }

    #[test]
    fn test_unit_spec_defaults_period() {
        let mut request = request();
        request.period_secs = None;
        request.key_path = None;
        request.log_path = None;

        let spec = unit_spec(&request, &AppConfig::default(), Path::new("/opt/ssh-mounter"));
        assert!(spec.command_line.ends_with("-p 60 -q"));
    }

    #[test]
    fn test_install_then_reinstall() {
        let dir = tempdir().unwrap();
        let runner = RecordingRunner::new();
        let installer = ServiceInstaller::new(&runner, dir.path());
        let spec = unit_spec(&request(), &AppConfig::default(), Path::new("/usr/bin/ssh-mounter"));

        let outcome = install_service(&installer, &spec, CommandCheck::Strict).unwrap();
        assert!(matches!(outcome, InstallOutcome::Installed { .. }));
        assert_eq!(
            runner.commands(),
            [
                "systemctl daemon-reload",
                "systemctl enable home-user@ssh-mounter.service",
                "systemctl start home-user@ssh-mounter.service",
            ]
        );
        let written = fs::read_to_string(dir.path().join("home-user@ssh-mounter.service")).unwrap();
        assert_eq!(written, spec.render());

        let outcome = install_service(&installer, &spec, CommandCheck::Strict).unwrap();
        assert!(matches!(outcome, InstallOutcome::AlreadyExists { .. }));
        assert_eq!(runner.commands().len(), 3);
    }

    #[test]
    fn test_remove_and_status() {
        let dir = tempdir().unwrap();
        let runner = RecordingRunner::new();
        let installer = ServiceInstaller::new(&runner, dir.path());

        let (name, state) = service_status(&installer, &request()).unwrap();
        assert_eq!(name, "home-user@ssh-mounter");
        assert_eq!(state, UnitState::Absent);

        let outcome = remove_service(&installer, &request()).unwrap();
        assert!(matches!(outcome, RemoveOutcome::NotInstalled { .. }));

        fs::write(installer.unit_path("home-user@ssh-mounter"), "unit").unwrap();
        let outcome = remove_service(&installer, &request()).unwrap();
        assert!(matches!(outcome, RemoveOutcome::Removed { .. }));
    }
}
