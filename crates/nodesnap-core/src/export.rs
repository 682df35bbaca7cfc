//! Snapshot export: one collection pass written as a text exposition file.
//!
//! The snapshot is encoded into a temporary file in the destination directory
//! and renamed over the destination, so readers see either the previous file
//! or the complete new one.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use prometheus::{Encoder, Registry, TextEncoder};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

/// Errors raised while writing a snapshot.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("couldn't encode metrics: {0}")]
    Encode(#[from] prometheus::Error),

    #[error("couldn't write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What a successful export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    /// Number of metric families (one `# TYPE` block each).
    pub families: usize,
    /// Number of sample lines.
    pub samples: usize,
}

/// Gathers `registry` once and atomically writes the text exposition to `path`.
pub fn write_to_textfile(path: &Path, registry: &Registry) -> Result<ExportSummary, ExportError> {
    let families = registry.gather();
    let samples = families.iter().map(|mf| mf.get_metric().len()).sum();

    let io_err = |source: io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    debug!("Writing snapshot via {}", tmp.path().display());

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        TextEncoder::new().encode(&families, &mut writer)?;
        writer.flush().map_err(io_err)?;
    }

    // Temporary files are created 0600; a snapshot is meant to be world readable.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;

    tmp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(ExportSummary {
        path: path.to_path_buf(),
        families: families.len(),
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{BuildInfoCollector, PROGRAM};
    use tempfile::tempdir;

    fn registry() -> Registry {
        let registry = Registry::new();
        registry
            .register(Box::new(BuildInfoCollector::new(PROGRAM).unwrap()))
            .unwrap();
        registry
    }

    #[test]
    fn test_write_to_textfile() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.out");

        let summary = write_to_textfile(&path, &registry()).unwrap();
        assert_eq!(summary.families, 1);
        assert_eq!(summary.samples, 1);
        assert_eq!(summary.path, path);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# TYPE nodesnap_build_info gauge"));
        assert!(content.contains("nodesnap_build_info{"));
        assert!(content.ends_with("} 1\n"));
    }

    #[test]
    fn test_overwrites_previous_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.out");
        fs::write(&path, "stale_metric 42\n").unwrap();

        write_to_textfile(&path, &registry()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale_metric"));
    }

    #[test]
    fn test_leaves_no_temporary_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.out");

        write_to_textfile(&path, &registry()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_snapshot_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.out");
        write_to_textfile(&path, &registry()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("metrics.out");

        let err = write_to_textfile(&path, &registry()).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
        assert!(!path.exists());
    }
}
