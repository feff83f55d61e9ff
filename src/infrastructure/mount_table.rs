//! Live mount table access.
//!
//! Reads the kernel mount table fresh on every query; nothing is cached.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppError, MountQuery, MountStatus, MountTable, Result};

/// Resolves mount state against a mount-table file.
#[derive(Debug, Clone)]
pub struct MountResolver {
    table_path: PathBuf,
}

impl MountResolver {
    /// Create a resolver reading `table_path` (normally `/proc/mounts`).
    #[must_use]
    pub fn new(table_path: impl Into<PathBuf>) -> Self {
        Self {
            table_path: table_path.into(),
        }
    }

    /// Path of the table being read.
    #[must_use]
    pub fn table_path(&self) -> &Path {
        &self.table_path
    }

    /// Read and parse the current table.
    ///
    /// # Errors
    /// Returns error if the table cannot be read.
    pub fn read_table(&self) -> Result<MountTable> {
        let content = fs::read_to_string(&self.table_path).map_err(|e| {
            AppError::io(
                format!("Failed to read mount table {}", self.table_path.display()),
                e,
            )
        })?;

        Ok(MountTable::parse(&content))
    }

    /// Classify `query` against the current table.
    ///
    /// # Errors
    /// Returns error if the table cannot be read.
    pub fn resolve(&self, query: &MountQuery) -> Result<MountStatus> {
        let table = self.read_table()?;
        let status = table.status(query);
        let fs_type = table
            .find(&query.local_path)
            .and_then(|record| record.fs_type.as_deref())
            .unwrap_or("-");

        tracing::debug!(
            table = %self.table_path().display(),
            local_path = %query.local_path,
            fs_type,
            expected = %query.expected_device,
            status = %status,
            "Mount state resolved"
        );

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_from_file() {
        let dir = tempdir().unwrap();
        let table = dir.path().join("mounts");
        fs::write(
            &table,
            "/dev/sda1 / ext4 rw 0 0\nbob@host:/home/bob /mnt/x fuse.sshfs rw 0 0\n",
        )
        .unwrap();

        let resolver = MountResolver::new(&table);
        let query = MountQuery::new("bob", "host", "/home/bob", "/mnt/x");
        assert_eq!(
            resolver.resolve(&query).unwrap(),
            MountStatus::AlreadyMountedAsExpected
        );

        // The table is re-read on every query.
        fs::write(&table, "/dev/sda1 / ext4 rw 0 0\n").unwrap();
        assert_eq!(resolver.resolve(&query).unwrap(), MountStatus::NotMounted);
    }

    #[test]
    fn test_unreadable_table_is_io_error() {
        let dir = tempdir().unwrap();
        let resolver = MountResolver::new(dir.path().join("missing"));
        let query = MountQuery::new("bob", "host", "/home/bob", "/mnt/x");

        assert!(matches!(resolver.resolve(&query), Err(AppError::Io { .. })));
    }
}
