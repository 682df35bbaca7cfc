//! Collectors for the Linux `/proc` filesystem.
//!
//! Parsing lives in [`parser`] as pure functions; the collectors here own the
//! metric vectors and translate parsed values into exposition units
//! (seconds, bytes).

mod diskstats;
mod loadavg;
mod meminfo;
mod netdev;
pub mod parser;
mod pressure;
mod stat;
mod vmstat;

use std::path::{Path, PathBuf};

use crate::collector::CollectorError;
use crate::collector::traits::FileSystem;

pub use diskstats::DiskstatsCollector;
pub use loadavg::LoadavgCollector;
pub use meminfo::MeminfoCollector;
pub use netdev::NetdevCollector;
pub use pressure::PressureCollector;
pub use stat::StatCollector;
pub use vmstat::VmstatCollector;

/// Clock ticks per second (USER_HZ). Standard value for Linux.
pub const USER_HZ: f64 = 100.0;

/// A procfs mountpoint read through a [`FileSystem`].
#[derive(Debug, Clone)]
pub struct ProcFs<F: FileSystem> {
    fs: F,
    root: PathBuf,
}

impl<F: FileSystem> ProcFs<F> {
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `root` - Procfs mountpoint (usually "/proc")
    pub fn new(fs: F, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    /// Absolute path of a file below the mountpoint.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Reads a file below the mountpoint.
    pub fn read(&self, relative: &str) -> Result<String, CollectorError> {
        let path = self.path(relative);
        self.fs
            .read_to_string(&path)
            .map_err(|source| CollectorError::Read { path, source })
    }

    /// Checks whether a file or directory exists below the mountpoint.
    pub fn exists(&self, relative: &str) -> bool {
        self.fs.exists(&self.path(relative))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
