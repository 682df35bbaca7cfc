//! Load average collector (`/proc/loadavg`).

use prometheus::core::{Collector as _, Desc};
use prometheus::proto::MetricFamily;
use prometheus::Gauge;

use super::ProcFs;
use super::parser::parse_loadavg;
use crate::collector::traits::FileSystem;
use crate::collector::{Collector, CollectorError, gauge};

/// Exposes the 1, 5 and 15 minute load averages.
pub struct LoadavgCollector<F: FileSystem> {
    procfs: ProcFs<F>,
    load1: Gauge,
    load5: Gauge,
    load15: Gauge,
}

impl<F: FileSystem> LoadavgCollector<F> {
    pub fn new(procfs: ProcFs<F>) -> Result<Self, CollectorError> {
        Ok(Self {
            procfs,
            load1: gauge("", "load1", "1m load average.")?,
            load5: gauge("", "load5", "5m load average.")?,
            load15: gauge("", "load15", "15m load average.")?,
        })
    }
}

impl<F: FileSystem> Collector for LoadavgCollector<F> {
    fn describe(&self) -> Vec<&Desc> {
        [&self.load1, &self.load5, &self.load15]
            .into_iter()
            .flat_map(|g| g.desc())
            .collect()
    }

    fn update(&self) -> Result<Vec<MetricFamily>, CollectorError> {
        let avg = parse_loadavg(&self.procfs.read("loadavg")?)?;

        self.load1.set(avg.load1);
        self.load5.set(avg.load5);
        self.load15.set(avg.load15);

        Ok([&self.load1, &self.load5, &self.load15]
            .into_iter()
            .flat_map(|g| g.collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MockFs;

    #[test]
    fn test_loadavg_update() {
        let collector = LoadavgCollector::new(ProcFs::new(MockFs::typical_system(), "/proc")).unwrap();
        let families = collector.update().unwrap();

        let names: Vec<&str> = families.iter().map(|mf| mf.get_name()).collect();
        assert_eq!(names, ["node_load1", "node_load5", "node_load15"]);
        assert_eq!(families[0].get_metric()[0].get_gauge().get_value(), 0.15);
        assert_eq!(collector.describe().len(), 3);
    }

    #[test]
    fn test_loadavg_missing_file() {
        let collector = LoadavgCollector::new(ProcFs::new(MockFs::new(), "/proc")).unwrap();
        assert!(matches!(
            collector.update(),
            Err(CollectorError::Read { .. })
        ));
    }
}
