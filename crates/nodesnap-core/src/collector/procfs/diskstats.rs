//! Block device collector (`/proc/diskstats`).

use prometheus::core::{Collector as _, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{CounterVec, GaugeVec};
use regex::Regex;
use tracing::debug;

use super::ProcFs;
use super::parser::{DiskStats, parse_diskstats};
use crate::collector::traits::FileSystem;
use crate::collector::{Collector, CollectorError, counter_vec, gauge_vec};

/// Sector size used by the kernel when reporting diskstats, in bytes.
const SECTOR_SIZE: f64 = 512.0;

type Field = fn(&DiskStats) -> f64;

const COUNTERS: &[(&str, &str, Field)] = &[
    (
        "reads_completed_total",
        "The total number of reads completed successfully.",
        |d| d.reads as f64,
    ),
    (
        "reads_merged_total",
        "The total number of reads merged.",
        |d| d.reads_merged as f64,
    ),
    (
        "read_bytes_total",
        "The total number of bytes read successfully.",
        |d| d.read_sectors as f64 * SECTOR_SIZE,
    ),
    (
        "read_time_seconds_total",
        "The total number of seconds spent by all reads.",
        |d| d.read_time_ms as f64 / 1000.0,
    ),
    (
        "writes_completed_total",
        "The total number of writes completed successfully.",
        |d| d.writes as f64,
    ),
    (
        "writes_merged_total",
        "The number of writes merged.",
        |d| d.writes_merged as f64,
    ),
    (
        "written_bytes_total",
        "The total number of bytes written successfully.",
        |d| d.write_sectors as f64 * SECTOR_SIZE,
    ),
    (
        "write_time_seconds_total",
        "This is the total number of seconds spent by all writes.",
        |d| d.write_time_ms as f64 / 1000.0,
    ),
    (
        "io_time_seconds_total",
        "Total seconds spent doing I/Os.",
        |d| d.io_time_ms as f64 / 1000.0,
    ),
    (
        "io_time_weighted_seconds_total",
        "The weighted # of seconds spent doing I/Os.",
        |d| d.io_weighted_time_ms as f64 / 1000.0,
    ),
];

/// Exposes per-device I/O counters, skipping devices matching the ignore
/// pattern (partitions, loop and ram devices by default).
pub struct DiskstatsCollector<F: FileSystem> {
    procfs: ProcFs<F>,
    ignored: Regex,
    counters: Vec<(Field, CounterVec)>,
    io_now: GaugeVec,
}

impl<F: FileSystem> DiskstatsCollector<F> {
    pub fn new(procfs: ProcFs<F>, ignored_devices: &str) -> Result<Self, CollectorError> {
        let ignored = Regex::new(ignored_devices).map_err(|e| {
            CollectorError::Config(format!("invalid ignored-devices pattern: {e}"))
        })?;

        let counters = COUNTERS
            .iter()
            .map(|&(name, help, field)| {
                counter_vec("disk", name, help, &["device"]).map(|c| (field, c))
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            procfs,
            ignored,
            counters,
            io_now: gauge_vec(
                "disk",
                "io_now",
                "The number of I/Os currently in progress.",
                &["device"],
            )?,
        })
    }
}

impl<F: FileSystem> Collector for DiskstatsCollector<F> {
    fn describe(&self) -> Vec<&Desc> {
        let mut descs: Vec<&Desc> = self.counters.iter().flat_map(|(_, c)| c.desc()).collect();
        descs.extend(self.io_now.desc());
        descs
    }

    fn update(&self) -> Result<Vec<MetricFamily>, CollectorError> {
        let disks = parse_diskstats(&self.procfs.read("diskstats")?)?;

        for (_, counter) in &self.counters {
            counter.reset();
        }
        self.io_now.reset();

        for disk in &disks {
            if self.ignored.is_match(&disk.device) {
                debug!("Ignoring device: {}", disk.device);
                continue;
            }
            let labels = [disk.device.as_str()];
            for (field, counter) in &self.counters {
                counter.with_label_values(&labels).inc_by(field(disk));
            }
            self.io_now
                .with_label_values(&labels)
                .set(disk.io_in_progress as f64);
        }

        let mut families: Vec<MetricFamily> = self
            .counters
            .iter()
            .flat_map(|(_, c)| c.collect())
            .collect();
        families.extend(self.io_now.collect());
        Ok(families)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{DEFAULT_IGNORED_DEVICES, MockFs};

    fn devices(families: &[MetricFamily], name: &str) -> Vec<String> {
        families
            .iter()
            .find(|mf| mf.get_name() == name)
            .map(|mf| {
                mf.get_metric()
                    .iter()
                    .map(|m| m.get_label()[0].get_value().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_diskstats_ignores_partitions_and_loop() {
        let collector = DiskstatsCollector::new(
            ProcFs::new(MockFs::typical_system(), "/proc"),
            DEFAULT_IGNORED_DEVICES,
        )
        .unwrap();
        let families = collector.update().unwrap();

        let mut seen = devices(&families, "node_disk_reads_completed_total");
        seen.sort();
        assert_eq!(seen, ["nvme0n1", "sda"]);
    }

    #[test]
    fn test_diskstats_units() {
        let collector =
            DiskstatsCollector::new(ProcFs::new(MockFs::typical_system(), "/proc"), "^$").unwrap();
        let families = collector.update().unwrap();

        let read_bytes = families
            .iter()
            .find(|mf| mf.get_name() == "node_disk_read_bytes_total")
            .unwrap();
        let sda = read_bytes
            .get_metric()
            .iter()
            .find(|m| m.get_label()[0].get_value() == "sda")
            .unwrap();
        assert_eq!(sda.get_counter().get_value(), 987_654.0 * 512.0);

        assert_eq!(devices(&families, "node_disk_io_now").len(), 4);
    }

    #[test]
    fn test_diskstats_invalid_pattern() {
        let result = DiskstatsCollector::new(ProcFs::new(MockFs::new(), "/proc"), "(");
        assert!(matches!(result, Err(CollectorError::Config(_))));
    }
}
