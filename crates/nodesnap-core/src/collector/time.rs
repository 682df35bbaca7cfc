//! Wall clock collector.

use chrono::Utc;
use prometheus::Gauge;
use prometheus::core::{Collector as _, Desc};
use prometheus::proto::MetricFamily;

use crate::collector::{Collector, CollectorError, gauge};

/// Exposes the current system time.
pub struct TimeCollector {
    now: Gauge,
}

impl TimeCollector {
    pub fn new() -> Result<Self, CollectorError> {
        Ok(Self {
            now: gauge("", "time_seconds", "System time in seconds since epoch (1970).")?,
        })
    }
}

impl Collector for TimeCollector {
    fn describe(&self) -> Vec<&Desc> {
        self.now.desc()
    }

    fn update(&self) -> Result<Vec<MetricFamily>, CollectorError> {
        let now = Utc::now();
        self.now
            .set(now.timestamp() as f64 + f64::from(now.timestamp_subsec_nanos()) / 1e9);
        Ok(self.now.collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_is_recent() {
        let collector = TimeCollector::new().unwrap();
        let families = collector.update().unwrap();

        assert_eq!(families[0].get_name(), "node_time_seconds");
        let value = families[0].get_metric()[0].get_gauge().get_value();
        // 2020-09-13T12:26:40Z
        assert!(value > 1_600_000_000.0);
    }
}
