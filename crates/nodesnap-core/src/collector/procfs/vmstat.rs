//! Virtual memory statistics collector (`/proc/vmstat`).

use prometheus::Counter;
use prometheus::core::{Collector as _, Desc};
use prometheus::proto::MetricFamily;

use super::ProcFs;
use super::parser::parse_vmstat;
use crate::collector::traits::FileSystem;
use crate::collector::{Collector, CollectorError, counter, set_counter};

/// Paging, swapping and OOM counters exported as `node_vmstat_<field>`.
const FIELDS: &[&str] = &[
    "oom_kill",
    "pgfault",
    "pgmajfault",
    "pgpgin",
    "pgpgout",
    "pswpin",
    "pswpout",
];

pub struct VmstatCollector<F: FileSystem> {
    procfs: ProcFs<F>,
    counters: Vec<(&'static str, Counter)>,
}

impl<F: FileSystem> VmstatCollector<F> {
    pub fn new(procfs: ProcFs<F>) -> Result<Self, CollectorError> {
        let counters = FIELDS
            .iter()
            .map(|&field| {
                let help = format!("/proc/vmstat information field {field}.");
                counter("vmstat", field, &help).map(|c| (field, c))
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { procfs, counters })
    }
}

impl<F: FileSystem> Collector for VmstatCollector<F> {
    fn describe(&self) -> Vec<&Desc> {
        self.counters.iter().flat_map(|(_, c)| c.desc()).collect()
    }

    fn update(&self) -> Result<Vec<MetricFamily>, CollectorError> {
        let fields = parse_vmstat(&self.procfs.read("vmstat")?)?;

        let mut families = Vec::new();
        for (field, counter) in &self.counters {
            if let Some(&value) = fields.get(*field) {
                set_counter(counter, value as f64);
                families.extend(counter.collect());
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
    fn test_vmstat_update() {
        let collector = VmstatCollector::new(ProcFs::new(MockFs::typical_system(), "/proc")).unwrap();
        let families = collector.update().unwrap();

        let names: Vec<&str> = families.iter().map(|mf| mf.get_name()).collect();
        assert_eq!(
            names,
            [
                "node_vmstat_oom_kill",
                "node_vmstat_pgfault",
                "node_vmstat_pgmajfault",
                "node_vmstat_pgpgin",
                "node_vmstat_pgpgout",
                "node_vmstat_pswpin",
                "node_vmstat_pswpout",
            ]
        );
        assert_eq!(families[1].get_metric()[0].get_counter().get_value(), 999_999.0);
    }
}
