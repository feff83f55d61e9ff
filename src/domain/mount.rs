//! Mount-table domain models.
//!
//! Classifies a local mount point against the device we expect to find
//! there. Everything here is pure; reading the live table is done by
//! `infrastructure::mount_table`.

use std::fmt;

/// A single line of the mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRecord {
    /// Source device, e.g. `user@host:/remote/path`.
    pub device: String,
    /// Local mount point exactly as the kernel reports it.
    pub mount_point: String,
    /// Filesystem type column, when present.
    pub fs_type: Option<String>,
}

impl MountRecord {
    /// Parse one whitespace-delimited mount-table line.
    ///
    /// Returns `None` for lines with fewer than two columns.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut columns = line.split_whitespace();
        let device = columns.next()?;
        let mount_point = columns.next()?;

        Some(Self {
            device: device.to_string(),
            mount_point: mount_point.to_string(),
            fs_type: columns.next().map(String::from),
        })
    }
}

/// Inputs to a mount-state check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountQuery {
    /// Local mount point to look for.
    pub local_path: String,
    /// Device string we expect to be mounted there.
    pub expected_device: String,
}

impl MountQuery {
    /// Build a query for `username@host:remote_path` mounted at `local_path`.
    #[must_use]
    pub fn new(username: &str, host: &str, remote_path: &str, local_path: &str) -> Self {
        Self {
            local_path: local_path.to_string(),
            expected_device: remote_device(username, host, remote_path),
        }
    }
}

/// Format the `user@host:path` device string sshfs is invoked with.
#[must_use]
pub fn remote_device(username: &str, host: &str, remote_path: &str) -> String {
    format!("{username}@{host}:{remote_path}")
}

/// Point-in-time classification of a mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountStatus {
    /// Nothing is mounted at the local path.
    NotMounted,
    /// The expected device is mounted at the local path.
    AlreadyMountedAsExpected,
    /// Something else is mounted at the local path.
    BusyWithOther {
        /// Device reported for the mount point.
        device: String,
    },
}

impl fmt::Display for MountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMounted => write!(f, "not mounted"),
            Self::AlreadyMountedAsExpected => write!(f, "mounted as expected"),
            Self::BusyWithOther { device } => write!(f, "busy with {device}"),
        }
    }
}

/// Whether a reported device string identifies the expected device.
///
/// sshfs may decorate the device it reports, so this is a substring test.
#[must_use]
pub fn device_matches(reported: &str, expected: &str) -> bool {
    reported.contains(expected)
}

/// Parsed mount table.
#[derive(Debug, Clone, Default)]
pub struct MountTable {
    records: Vec<MountRecord>,
}

impl MountTable {
    /// Parse the text of a mount table, skipping malformed lines.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        Self {
            records: content.lines().filter_map(MountRecord::parse_line).collect(),
        }
    }

    /// First record mounted at `mount_point`.
    #[must_use]
    pub fn find(&self, mount_point: &str) -> Option<&MountRecord> {
        self.records.iter().find(|r| r.mount_point == mount_point)
    }

    /// Classify the query against this table.
    ///
    /// The first record whose mount point equals `local_path` decides.
    #[must_use]
    pub fn status(&self, query: &MountQuery) -> MountStatus {
        let Some(record) = self.find(&query.local_path) else {
            return MountStatus::NotMounted;
        };

        if device_matches(&record.device, &query.expected_device) {
            MountStatus::AlreadyMountedAsExpected
        } else {
            MountStatus::BusyWithOther {
                device: record.device.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
/dev/sda1 / ext4 rw,relatime 0 0
bob@host:/home/bob /mnt/x fuse.sshfs rw,nosuid,nodev,relatime,user_id=0,group_id=0 0 0
";

    fn query(local: &str, device: &str) -> MountQuery {
        MountQuery {
            local_path: local.into(),
            expected_device: device.into(),
        }
    }

    #[test]
    fn test_expected_device_is_mounted() {
        let table = MountTable::parse(TABLE);
        assert_eq!(
            table.status(&query("/mnt/x", "bob@host:/home/bob")),
            MountStatus::AlreadyMountedAsExpected
        );
    }

    #[test]
    fn test_other_device_is_busy() {
        let table = MountTable::parse(TABLE);
        assert_eq!(
            table.status(&query("/mnt/x", "alice@host:/home/alice")),
            MountStatus::BusyWithOther {
                device: "bob@host:/home/bob".into()
            }
        );
    }

    #[test]
    fn test_unknown_mount_point_is_not_mounted() {
        let table = MountTable::parse(TABLE);
        assert_eq!(
            table.status(&query("/mnt/y", "bob@host:/home/bob")),
            MountStatus::NotMounted
        );
        assert_eq!(
            MountTable::parse("").status(&query("/mnt/x", "bob@host:/home/bob")),
            MountStatus::NotMounted
        );
    }

    #[test]
    fn test_mount_point_compared_without_normalization() {
        let table = MountTable::parse(TABLE);
        assert_eq!(
            table.status(&query("/mnt/x/", "bob@host:/home/bob")),
            MountStatus::NotMounted
        );
        assert_eq!(
            table.status(&query("/mnt/./x", "bob@host:/home/bob")),
            MountStatus::NotMounted
        );
    }

    #[test]
    fn test_decorated_device_still_matches() {
        let table = MountTable::parse("sshfs#bob@host:/home/bob/ /mnt/x fuse.sshfs rw 0 0\n");
        assert_eq!(
            table.status(&query("/mnt/x", "bob@host:/home/bob")),
            MountStatus::AlreadyMountedAsExpected
        );
    }

    #[test]
    fn test_first_duplicate_mount_point_wins() {
        let table = MountTable::parse(
            "alice@host:/home/alice /mnt/x fuse.sshfs rw 0 0\n\
             bob@host:/home/bob /mnt/x fuse.sshfs rw 0 0\n",
        );
        assert_eq!(
            table.status(&query("/mnt/x", "bob@host:/home/bob")),
            MountStatus::BusyWithOther {
                device: "alice@host:/home/alice".into()
            }
        );
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let table = MountTable::parse("garbage\n\n   \nbob@host:/home/bob /mnt/x\n");
        assert_eq!(
            table.find("/mnt/x"),
            Some(&MountRecord {
                device: "bob@host:/home/bob".into(),
                mount_point: "/mnt/x".into(),
                fs_type: None,
            })
        );
        assert_eq!(table.find("garbage"), None);
        assert_eq!(
            table.status(&query("/mnt/x", "bob@host:/home/bob")),
            MountStatus::AlreadyMountedAsExpected
        );
    }

    #[test]
    fn test_query_builds_remote_device() {
        let q = MountQuery::new("bob", "host", "/home/bob", "/mnt/x");
        assert_eq!(q.expected_device, "bob@host:/home/bob");
        assert_eq!(q.local_path, "/mnt/x");
    }
}
