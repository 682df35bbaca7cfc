//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait lets collectors read the real `/proc` filesystem on
//! Linux or an in-memory [`MockFs`](crate::collector::MockFs) in tests.

use std::io;
use std::path::Path;

/// Abstraction for the read-only filesystem operations collectors need.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_fs_read_to_string() {
        let fs = RealFs::new();
        // The crate manifest is always present next to the sources.
        let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        let content = fs.read_to_string(&manifest).unwrap();
        assert!(content.contains("nodesnap-core"));
    }

    #[test]
    fn test_real_fs_exists() {
        let fs = RealFs::new();
        assert!(fs.exists(Path::new(env!("CARGO_MANIFEST_DIR"))));
        assert!(!fs.exists(Path::new("/nonexistent/path/12345")));
    }

    #[test]
    fn test_real_fs_missing_file_is_not_found() {
        let fs = RealFs::new();
        let err = fs
            .read_to_string(Path::new("/nonexistent/path/12345"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
