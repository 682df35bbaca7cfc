//! Network device collector (`/proc/net/dev`).

use prometheus::CounterVec;
use prometheus::core::{Collector as _, Desc};
use prometheus::proto::MetricFamily;

use super::ProcFs;
use super::parser::{NetDevStats, parse_net_dev};
use crate::collector::traits::FileSystem;
use crate::collector::{Collector, CollectorError, counter_vec};

type Field = fn(&NetDevStats) -> u64;

const COUNTERS: &[(&str, &str, Field)] = &[
    ("receive", "bytes", |d| d.rx_bytes),
    ("receive", "packets", |d| d.rx_packets),
    ("receive", "errs", |d| d.rx_errs),
    ("receive", "drop", |d| d.rx_drop),
    ("transmit", "bytes", |d| d.tx_bytes),
    ("transmit", "packets", |d| d.tx_packets),
    ("transmit", "errs", |d| d.tx_errs),
    ("transmit", "drop", |d| d.tx_drop),
];

/// Exposes receive and transmit counters per network interface.
pub struct NetdevCollector<F: FileSystem> {
    procfs: ProcFs<F>,
    counters: Vec<(Field, CounterVec)>,
}

impl<F: FileSystem> NetdevCollector<F> {
    pub fn new(procfs: ProcFs<F>) -> Result<Self, CollectorError> {
        let counters = COUNTERS
            .iter()
            .map(|&(direction, what, field)| {
                let name = format!("{direction}_{what}_total");
                let help = format!("Network device statistic {direction}_{what}.");
                counter_vec("network", &name, &help, &["device"]).map(|c| (field, c))
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { procfs, counters })
    }
}

impl<F: FileSystem> Collector for NetdevCollector<F> {
    fn describe(&self) -> Vec<&Desc> {
        self.counters.iter().flat_map(|(_, c)| c.desc()).collect()
    }

    fn update(&self) -> Result<Vec<MetricFamily>, CollectorError> {
        let devices = parse_net_dev(&self.procfs.read("net/dev")?)?;

        let mut families = Vec::with_capacity(self.counters.len());
        for (field, counter) in &self.counters {
            counter.reset();
            for device in &devices {
                counter
                    .with_label_values(&[device.interface.as_str()])
                    .inc_by(field(device) as f64);
            }
            families.extend(counter.collect());
        }
        Ok(families)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MockFs;

    #[test]
    fn test_netdev_update() {
        let collector = NetdevCollector::new(ProcFs::new(MockFs::typical_system(), "/proc")).unwrap();
        let families = collector.update().unwrap();
        assert_eq!(families.len(), 8);

        let rx_bytes = families
            .iter()
            .find(|mf| mf.get_name() == "node_network_receive_bytes_total")
            .unwrap();
        assert_eq!(rx_bytes.get_metric().len(), 2);

        let eth0 = rx_bytes
            .get_metric()
            .iter()
            .find(|m| m.get_label()[0].get_value() == "eth0")
            .unwrap();
        assert_eq!(eth0.get_counter().get_value(), 987_654_321.0);
    }

    #[test]
    fn test_netdev_malformed_line() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/net/dev", "  eth0: 1 2 3\n");
        let collector = NetdevCollector::new(ProcFs::new(fs, "/proc")).unwrap();

        assert!(matches!(
            collector.update(),
            Err(CollectorError::Parse(_))
        ));
    }
}
