//! The validated parameters of one invocation.

use std::path::PathBuf;

use super::mount::{remote_device, MountQuery};

/// Validated mount parameters.
#[derive(Debug, Clone, Default)]
pub struct MountRequest {
    /// Remote username.
    pub username: String,
    /// Remote host name or IPv4 address.
    pub host: String,
    /// Remote path to mount.
    pub remote_path: String,
    /// Local mount point.
    pub local_path: String,
    /// Identity file, if one is known.
    pub key_path: Option<String>,
    /// Never prompt; every validation failure is fatal.
    pub quiet: bool,
    /// Password for a remote user to create.
    pub create_remote: Option<String>,
    /// Log file, when file logging is enabled.
    pub log_path: Option<PathBuf>,
    /// Automount period in seconds.
    pub period_secs: Option<u64>,
}

impl MountRequest {
    /// `user@host`, the SSH destination.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }

    /// `user@host:remote_path`, the device handed to sshfs.
    #[must_use]
    pub fn remote_device(&self) -> String {
        remote_device(&self.username, &self.host, &self.remote_path)
    }

    /// Mount-state query for this request.
    #[must_use]
    pub fn mount_query(&self) -> MountQuery {
        MountQuery::new(&self.username, &self.host, &self.remote_path, &self.local_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_strings() {
        let request = MountRequest {
            username: "bob".into(),
            host: "nas.local".into(),
            remote_path: "/home/bob".into(),
            local_path: "/mnt/x".into(),
            ..Default::default()
        };

        assert_eq!(request.destination(), "bob@nas.local");
        assert_eq!(request.remote_device(), "bob@nas.local:/home/bob");
        assert_eq!(request.mount_query().expected_device, request.remote_device());
    }
}
