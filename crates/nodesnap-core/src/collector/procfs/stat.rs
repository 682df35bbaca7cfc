//! CPU and kernel statistics collector (`/proc/stat`).

use prometheus::core::{Collector as _, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Counter, CounterVec, Gauge};

use super::parser::parse_stat;
use super::{ProcFs, USER_HZ};
use crate::collector::traits::FileSystem;
use crate::collector::{Collector, CollectorError, counter, counter_vec, gauge, set_counter};

/// Exposes per-CPU time and kernel activity counters.
pub struct StatCollector<F: FileSystem> {
    procfs: ProcFs<F>,
    cpu: CounterVec,
    intr: Counter,
    context_switches: Counter,
    forks: Counter,
    boot_time: Gauge,
    procs_running: Gauge,
    procs_blocked: Gauge,
}

impl<F: FileSystem> StatCollector<F> {
    pub fn new(procfs: ProcFs<F>) -> Result<Self, CollectorError> {
        Ok(Self {
            procfs,
            cpu: counter_vec(
                "cpu",
                "seconds_total",
                "Seconds the CPUs spent in each mode.",
                &["cpu", "mode"],
            )?,
            intr: counter("", "intr_total", "Total number of interrupts serviced.")?,
            context_switches: counter(
                "",
                "context_switches_total",
                "Total number of context switches.",
            )?,
            forks: counter("", "forks_total", "Total number of forks.")?,
            boot_time: gauge("", "boot_time_seconds", "Node boot time, in unixtime.")?,
            procs_running: gauge(
                "",
                "procs_running",
                "Number of processes in runnable state.",
            )?,
            procs_blocked: gauge(
                "",
                "procs_blocked",
                "Number of processes blocked waiting for I/O to complete.",
            )?,
        })
    }
}

impl<F: FileSystem> Collector for StatCollector<F> {
    fn describe(&self) -> Vec<&Desc> {
        let mut descs = self.cpu.desc();
        descs.extend(self.intr.desc());
        descs.extend(self.context_switches.desc());
        descs.extend(self.forks.desc());
        descs.extend(self.boot_time.desc());
        descs.extend(self.procs_running.desc());
        descs.extend(self.procs_blocked.desc());
        descs
    }

    fn update(&self) -> Result<Vec<MetricFamily>, CollectorError> {
        let stat = parse_stat(&self.procfs.read("stat")?)?;

        self.cpu.reset();
        for cpu in &stat.cpus {
            let id = cpu.cpu.to_string();
            for (mode, ticks) in cpu.modes() {
                self.cpu
                    .with_label_values(&[id.as_str(), mode])
                    .inc_by(ticks as f64 / USER_HZ);
            }
        }
        set_counter(&self.intr, stat.intr as f64);
        set_counter(&self.context_switches, stat.ctxt as f64);
        set_counter(&self.forks, stat.processes as f64);
        self.boot_time.set(stat.btime as f64);
        self.procs_running.set(stat.procs_running as f64);
        self.procs_blocked.set(stat.procs_blocked as f64);

        let mut families = self.cpu.collect();
        families.extend(self.intr.collect());
        families.extend(self.context_switches.collect());
        families.extend(self.forks.collect());
        families.extend(self.boot_time.collect());
        families.extend(self.procs_running.collect());
        families.extend(self.procs_blocked.collect());
        Ok(families)
    }
}
