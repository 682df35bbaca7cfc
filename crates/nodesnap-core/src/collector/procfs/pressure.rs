//! Pressure stall information collector (`/proc/pressure/*`).

use prometheus::Counter;
use prometheus::core::{Collector as _, Desc};
use prometheus::proto::MetricFamily;

use super::ProcFs;
use super::parser::parse_psi;
use crate::collector::traits::FileSystem;
use crate::collector::{Collector, CollectorError, counter, set_counter};

const RESOURCES: &[&str] = &["cpu", "io", "memory"];

/// Exposes cumulative stall time per resource.
///
/// `waiting` is the `some` line (at least one task stalled), `stalled` is the
/// `full` line (all non-idle tasks stalled). CPU has no `stalled` counter.
pub struct PressureCollector<F: FileSystem> {
    procfs: ProcFs<F>,
    cpu_waiting: Counter,
    io_waiting: Counter,
    io_stalled: Counter,
    memory_waiting: Counter,
    memory_stalled: Counter,
}

impl<F: FileSystem> PressureCollector<F> {
    pub fn new(procfs: ProcFs<F>) -> Result<Self, CollectorError> {
        Ok(Self {
            procfs,
            cpu_waiting: counter(
                "pressure",
                "cpu_waiting_seconds_total",
                "Total time in seconds that processes have waited for CPU time",
            )?,
            io_waiting: counter(
                "pressure",
                "io_waiting_seconds_total",
                "Total time in seconds that processes have waited due to IO congestion",
            )?,
            io_stalled: counter(
                "pressure",
                "io_stalled_seconds_total",
                "Total time in seconds no process could make progress due to IO congestion",
            )?,
            memory_waiting: counter(
                "pressure",
                "memory_waiting_seconds_total",
                "Total time in seconds that processes have waited for memory",
            )?,
            memory_stalled: counter(
                "pressure",
                "memory_stalled_seconds_total",
                "Total time in seconds no process could make progress due to memory congestion",
            )?,
        })
    }

    fn counters(&self) -> [&Counter; 5] {
        [
            &self.cpu_waiting,
            &self.io_waiting,
            &self.io_stalled,
            &self.memory_waiting,
            &self.memory_stalled,
        ]
    }
}

impl<F: FileSystem> Collector for PressureCollector<F> {
    fn describe(&self) -> Vec<&Desc> {
        self.counters().into_iter().flat_map(|c| c.desc()).collect()
    }

    fn update(&self) -> Result<Vec<MetricFamily>, CollectorError> {
        if !self.procfs.exists("pressure") {
            return Err(CollectorError::Unavailable(format!(
                "pressure information is unavailable at {}, a Linux kernel >= 4.20 is required",
                self.procfs.path("pressure").display()
            )));
        }

        let mut families = Vec::new();
        for resource in RESOURCES {
            let stats = parse_psi(&self.procfs.read(&format!("pressure/{resource}"))?)?;
            let (waiting, stalled) = match *resource {
                "cpu" => (&self.cpu_waiting, None),
                "io" => (&self.io_waiting, Some(&self.io_stalled)),
                _ => (&self.memory_waiting, Some(&self.memory_stalled)),
            };

            if let Some(some) = stats.some {
                set_counter(waiting, some.total as f64 / 1_000_000.0);
                families.extend(waiting.collect());
            }
            if let (Some(stalled), Some(full)) = (stalled, stats.full) {
                set_counter(stalled, full.total as f64 / 1_000_000.0);
                families.extend(stalled.collect());
            }
        }
        Ok(families)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MockFs;

    #[test]
    fn test_pressure_update() {
        let collector = PressureCollector::new(ProcFs::new(MockFs::typical_system(), "/proc")).unwrap();
        let families = collector.update().unwrap();

        let names: Vec<&str> = families.iter().map(|mf| mf.get_name()).collect();
        assert_eq!(
            names,
            [
                "node_pressure_cpu_waiting_seconds_total",
                "node_pressure_io_waiting_seconds_total",
                "node_pressure_io_stalled_seconds_total",
                "node_pressure_memory_waiting_seconds_total",
                "node_pressure_memory_stalled_seconds_total",
            ]
        );
        assert_eq!(families[1].get_metric()[0].get_counter().get_value(), 5.0);
    }

    #[test]
    fn test_pressure_unavailable() {
        let collector = PressureCollector::new(ProcFs::new(MockFs::bare_system(), "/proc")).unwrap();
        let err = collector.update().unwrap_err();

        assert!(matches!(err, CollectorError::Unavailable(_)));
        assert!(err.to_string().contains("/proc/pressure"));
    }
}
