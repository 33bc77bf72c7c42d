//! Filesystem access used by the probes.
//!
//! Every probe reads `/proc` through [`FileSystem`], so the same sampling code
//! runs against the live kernel in production and against [`MockFs`] fixtures
//! in tests.
//!
//! [`MockFs`]: crate::collector::mock::MockFs

use std::io;
use std::path::{Path, PathBuf};

/// Read-only view of the filesystem the probes need.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Lists entries in a directory.
    ///
    /// # Returns
    /// Full paths of the directory entries, in no particular order.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Returns the target of a symbolic link without following it.
    ///
    /// `/proc/[pid]/fd/N` entries are links whose targets are either file
    /// paths or pseudo-paths such as `socket:[12345]`.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_real_fs_read_to_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loadavg");
        fs::write(&path, "0.15 0.10 0.05 1/150 1234\n").unwrap();

        let content = RealFs::new().read_to_string(&path).unwrap();
        assert!(content.starts_with("0.15"));
    }

    #[test]
    fn test_real_fs_read_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), "").unwrap();
        fs::write(dir.path().join("b"), "").unwrap();

        let entries = RealFs::new().read_dir(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_real_fs_read_link() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("3");
        std::os::unix::fs::symlink("/var/log/syslog", &link).unwrap();

        let target = RealFs::new().read_link(&link).unwrap();
        assert_eq!(target, PathBuf::from("/var/log/syslog"));
    }
}
