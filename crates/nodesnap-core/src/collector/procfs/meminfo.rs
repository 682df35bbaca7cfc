//! Memory collector (`/proc/meminfo`).

use prometheus::core::{Collector as _, Desc};
use prometheus::proto::MetricFamily;
use prometheus::Gauge;

use super::ProcFs;
use super::parser::parse_meminfo;
use crate::collector::traits::FileSystem;
use crate::collector::{Collector, CollectorError, gauge};

/// Meminfo fields exported as `node_memory_<Field>_bytes`.
const FIELDS: &[&str] = &[
    "Active",
    "AnonPages",
    "Buffers",
    "Cached",
    "Dirty",
    "Inactive",
    "Mapped",
    "MemAvailable",
    "MemFree",
    "MemTotal",
    "SReclaimable",
    "SUnreclaim",
    "Shmem",
    "Slab",
    "SwapCached",
    "SwapFree",
    "SwapTotal",
    "Writeback",
];

/// Exposes a fixed set of `/proc/meminfo` fields in bytes.
///
/// Fields missing on the running kernel are left out of the pass instead of
/// being reported as zero.
pub struct MeminfoCollector<F: FileSystem> {
    procfs: ProcFs<F>,
    gauges: Vec<(&'static str, Gauge)>,
}

impl<F: FileSystem> MeminfoCollector<F> {
    pub fn new(procfs: ProcFs<F>) -> Result<Self, CollectorError> {
        let gauges = FIELDS
            .iter()
            .map(|&field| {
                let help = format!("Memory information field {field}_bytes.");
                gauge("memory", &format!("{field}_bytes"), &help).map(|g| (field, g))
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { procfs, gauges })
    }
}

impl<F: FileSystem> Collector for MeminfoCollector<F> {
    fn describe(&self) -> Vec<&Desc> {
        self.gauges.iter().flat_map(|(_, g)| g.desc()).collect()
    }

    fn update(&self) -> Result<Vec<MetricFamily>, CollectorError> {
        let fields = parse_meminfo(&self.procfs.read("meminfo")?)?;

        let mut families = Vec::new();
        for (field, gauge) in &self.gauges {
            if let Some(&value) = fields.get(*field) {
                gauge.set(value as f64);
                families.extend(gauge.collect());
            }
        }
        Ok(families)
    }
}
