//! Host metrics collectors.
//!
//! Each collector reads one slice of host state and turns it into Prometheus
//! metric families. [`NodeCollector`] owns the enabled collectors by name and
//! is registered as a single source with a [`prometheus::Registry`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        NodeCollector                         │
//! │   name -> Box<dyn Collector>     scrape duration / success   │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐         │
//! │  │ loadavg  │ │ meminfo  │ │   stat   │ │   ...    │  time   │
//! │  └────┬─────┘ └────┬─────┘ └────┬─────┘ └────┬─────┘         │
//! │       └────────────┴──────┬─────┴────────────┘               │
//! │                    ┌──────▼──────┐                           │
//! │                    │   ProcFs    │                           │
//! │                    └──────┬──────┘                           │
//! └───────────────────────────┼──────────────────────────────────┘
//!                     ┌───────▼───────┐
//!                     │  FileSystem   │ (trait)
//!                     └───────┬───────┘
//!                   ┌─────────┴─────────┐
//!            ┌──────▼──────┐     ┌──────▼──────┐
//!            │   RealFs    │     │   MockFs    │
//!            └─────────────┘     └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use nodesnap_core::collector::{CollectorArgs, MockFs, NodeCollector};
//!
//! let args = CollectorArgs::default();
//! let node = NodeCollector::new(MockFs::typical_system(), &args).unwrap();
//! assert_eq!(node.collector_names()[0], "diskstats");
//! ```

pub mod mock;
mod node;
pub mod procfs;
mod time;
pub mod traits;

use std::io;
use std::path::PathBuf;

use clap::Args;
use prometheus::core::Desc;
use prometheus::proto::MetricFamily;
use prometheus::{Counter, CounterVec, Gauge, GaugeVec, Opts};
use thiserror::Error;

pub use mock::MockFs;
pub use node::NodeCollector;
pub use procfs::parser::ParseError;
pub use time::TimeCollector;
pub use traits::{FileSystem, RealFs};

/// Namespace prefixed to every host metric.
pub const NAMESPACE: &str = "node";

/// Every collector name [`NodeCollector::new`] knows how to build.
pub const AVAILABLE_COLLECTORS: &[&str] = &[
    "diskstats",
    "loadavg",
    "meminfo",
    "netdev",
    "pressure",
    "stat",
    "time",
    "vmstat",
];

/// Devices skipped by the diskstats collector unless overridden.
pub const DEFAULT_IGNORED_DEVICES: &str = r"^(ram|loop|fd|(h|s|v|xv)d[a-z]|nvme\d+n\d+p)\d+$";

/// Errors raised while building or running a collector.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// A collector name that is not in [`AVAILABLE_COLLECTORS`].
    #[error("unknown collector: {0}")]
    Unknown(String),

    /// Two collectors registered under the same name.
    #[error("duplicate collector name: {0}")]
    Duplicate(String),

    /// Invalid collector configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The host does not expose the data this collector needs.
    #[error("{0}")]
    Unavailable(String),

    /// A host file could not be read.
    #[error("couldn't read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A host file had unexpected content.
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// Metric descriptor or value rejected by the metrics library.
    #[error("metric error: {0}")]
    Metric(#[from] prometheus::Error),
}

/// A source of metric families, updated once per collection pass.
///
/// Implementations create their metric vectors up front so that
/// [`describe`](Collector::describe) can report every descriptor before the
/// first read; [`update`](Collector::update) resets and refills them.
pub trait Collector: Send + Sync {
    /// Descriptors of every metric this collector may produce.
    fn describe(&self) -> Vec<&Desc>;

    /// Reads current host state and returns the resulting metric families.
    fn update(&self) -> Result<Vec<MetricFamily>, CollectorError>;
}

/// Collector selection and per-collector settings.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct CollectorArgs {
    /// Procfs mountpoint.
    #[arg(long = "path.procfs", value_name = "PATH", default_value = "/proc")]
    pub procfs: PathBuf,

    /// Comma-separated list of collectors to use.
    #[arg(
        long = "collectors.enabled",
        value_name = "NAMES",
        value_delimiter = ',',
        default_values = ["diskstats", "loadavg", "meminfo", "netdev", "pressure", "stat", "time", "vmstat"]
    )]
    pub enabled: Vec<String>,

    /// Regexp of devices to ignore for diskstats.
    #[arg(
        long = "collector.diskstats.ignored-devices",
        value_name = "REGEX",
        default_value = DEFAULT_IGNORED_DEVICES
    )]
    pub ignored_devices: String,
}

impl Default for CollectorArgs {
    fn default() -> Self {
        Self {
            procfs: PathBuf::from("/proc"),
            enabled: AVAILABLE_COLLECTORS.iter().map(|s| s.to_string()).collect(),
            ignored_devices: DEFAULT_IGNORED_DEVICES.to_string(),
        }
    }
}

fn opts(subsystem: &str, name: &str, help: &str) -> Opts {
    Opts::new(name, help)
        .namespace(NAMESPACE)
        .subsystem(subsystem)
}

pub(crate) fn gauge(subsystem: &str, name: &str, help: &str) -> prometheus::Result<Gauge> {
    Gauge::with_opts(opts(subsystem, name, help))
}

pub(crate) fn gauge_vec(
    subsystem: &str,
    name: &str,
    help: &str,
    labels: &[&str],
) -> prometheus::Result<GaugeVec> {
    GaugeVec::new(opts(subsystem, name, help), labels)
}

pub(crate) fn counter(subsystem: &str, name: &str, help: &str) -> prometheus::Result<Counter> {
    Counter::with_opts(opts(subsystem, name, help))
}

pub(crate) fn counter_vec(
    subsystem: &str,
    name: &str,
    help: &str,
    labels: &[&str],
) -> prometheus::Result<CounterVec> {
    CounterVec::new(opts(subsystem, name, help), labels)
}

/// Sets a counter to an absolute value read from the host.
pub(crate) fn set_counter(counter: &Counter, value: f64) {
    counter.reset();
    counter.inc_by(value);
}
