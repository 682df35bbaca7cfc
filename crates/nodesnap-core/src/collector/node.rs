//! The named set of enabled collectors.
//!
//! `NodeCollector` owns every enabled collector by name and is registered as
//! one composite source. Each collection pass runs the members one after the
//! other and adds per-member scrape duration and success gauges.

use std::collections::HashMap;
use std::time::Instant;

use prometheus::GaugeVec;
use prometheus::core::{Collector as PromCollector, Desc};
use prometheus::proto::MetricFamily;
use tracing::{debug, error};

use crate::collector::procfs::{
    DiskstatsCollector, LoadavgCollector, MeminfoCollector, NetdevCollector, PressureCollector,
    ProcFs, StatCollector, VmstatCollector,
};
use crate::collector::traits::FileSystem;
use crate::collector::{Collector, CollectorArgs, CollectorError, TimeCollector, gauge_vec};

/// Mapping from collector name to collector, plus scrape meta-metrics.
pub struct NodeCollector {
    collectors: HashMap<String, Box<dyn Collector>>,
    scrape_duration: GaugeVec,
    scrape_success: GaugeVec,
}

impl NodeCollector {
    /// Builds every collector named in `args.enabled`, reading procfs through `fs`.
    ///
    /// Repeated names are built once. Fails on the first unknown name or
    /// collector that cannot be initialized.
    pub fn new<F>(fs: F, args: &CollectorArgs) -> Result<Self, CollectorError>
    where
        F: FileSystem + Clone + 'static,
    {
        let mut collectors: Vec<(String, Box<dyn Collector>)> = Vec::new();
        for name in &args.enabled {
            if collectors.iter().any(|(existing, _)| existing == name) {
                continue;
            }
            let collector = build_collector(name, fs.clone(), args)?;
            collectors.push((name.clone(), collector));
        }
        Self::from_collectors(collectors)
    }

    /// Assembles a set from already constructed collectors.
    ///
    /// Names must be unique.
    pub fn from_collectors<I>(collectors: I) -> Result<Self, CollectorError>
    where
        I: IntoIterator<Item = (String, Box<dyn Collector>)>,
    {
        let mut by_name = HashMap::new();
        for (name, collector) in collectors {
            if by_name.contains_key(&name) {
                return Err(CollectorError::Duplicate(name));
            }
            by_name.insert(name, collector);
        }

        Ok(Self {
            collectors: by_name,
            scrape_duration: gauge_vec(
                "scrape",
                "collector_duration_seconds",
                "nodesnap: Duration of a collector scrape.",
                &["collector"],
            )?,
            scrape_success: gauge_vec(
                "scrape",
                "collector_success",
                "nodesnap: Whether a collector succeeded.",
                &["collector"],
            )?,
        })
    }

    /// Collector names in ascending lexicographic order.
    pub fn collector_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.collectors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    fn sorted(&self) -> Vec<(&str, &dyn Collector)> {
        let mut entries: Vec<(&str, &dyn Collector)> = self
            .collectors
            .iter()
            .map(|(name, c)| (name.as_str(), c.as_ref()))
            .collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }
}

impl PromCollector for NodeCollector {
    /// Scrape meta-metric descriptors followed by every member's descriptors,
    /// so the registry can reject names that collide with other sources.
    fn desc(&self) -> Vec<&Desc> {
        let mut descs = self.scrape_duration.desc();
        descs.extend(self.scrape_success.desc());
        for (_, collector) in self.sorted() {
            descs.extend(collector.describe());
        }
        descs
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.scrape_duration.reset();
        self.scrape_success.reset();

        let mut families = Vec::new();
        for (name, collector) in self.sorted() {
            let begin = Instant::now();
            let result = collector.update();
            let elapsed = begin.elapsed().as_secs_f64();

            let success = match result {
                Ok(mut collected) => {
                    debug!("OK: {} collector succeeded after {:.6}s", name, elapsed);
                    families.append(&mut collected);
                    1.0
                }
                Err(e) => {
                    error!("ERROR: {} collector failed after {:.6}s: {}", name, elapsed, e);
                    0.0
                }
            };
            self.scrape_duration.with_label_values(&[name]).set(elapsed);
            self.scrape_success.with_label_values(&[name]).set(success);
        }

        families.extend(self.scrape_duration.collect());
        families.extend(self.scrape_success.collect());
        families
    }
}

fn build_collector<F>(
    name: &str,
    fs: F,
    args: &CollectorArgs,
) -> Result<Box<dyn Collector>, CollectorError>
where
    F: FileSystem + Clone + 'static,
{
    let procfs = ProcFs::new(fs, &args.procfs);
    let collector: Box<dyn Collector> = match name {
        "diskstats" => Box::new(DiskstatsCollector::new(procfs, &args.ignored_devices)?),
        "loadavg" => Box::new(LoadavgCollector::new(procfs)?),
        "meminfo" => Box::new(MeminfoCollector::new(procfs)?),
        "netdev" => Box::new(NetdevCollector::new(procfs)?),
        "pressure" => Box::new(PressureCollector::new(procfs)?),
        "stat" => Box::new(StatCollector::new(procfs)?),
        "time" => Box::new(TimeCollector::new()?),
        "vmstat" => Box::new(VmstatCollector::new(procfs)?),
        unknown => return Err(CollectorError::Unknown(unknown.to_string())),
    };
    Ok(collector)
}
