//! Build metadata and the build-info metric.
//!
//! Values are embedded by `build.rs` at compile time.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts};

/// Program name used in log lines and as the build-info metric prefix.
pub const PROGRAM: &str = "nodesnap";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const REVISION: &str = env!("GIT_SHA");
pub const BRANCH: &str = env!("GIT_BRANCH");
pub const BUILD_USER: &str = env!("BUILD_USER");
pub const BUILD_DATE: &str = env!("BUILD_DATE");
pub const RUST_VERSION: &str = env!("RUSTC_VERSION");

/// Multi-line text printed by `--version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (branch: ",
    env!("GIT_BRANCH"),
    ", revision: ",
    env!("GIT_SHA"),
    ")\n  build user:       ",
    env!("BUILD_USER"),
    "\n  build date:       ",
    env!("BUILD_DATE"),
    "\n  rust version:     ",
    env!("RUSTC_VERSION"),
);

/// Version information, e.g. `(version=0.1.0, branch=main, revision=1a2b3c4)`.
pub fn info() -> String {
    format!("(version={VERSION}, branch={BRANCH}, revision={REVISION})")
}

/// Build context, e.g. `(rustc=1.85.0, user=ci, date=20250101-12:00:00)`.
pub fn build_context() -> String {
    format!("(rustc={RUST_VERSION}, user={BUILD_USER}, date={BUILD_DATE})")
}

/// Static metric source exposing `<program>_build_info` with a constant `1`.
pub struct BuildInfoCollector {
    info: GaugeVec,
}

impl BuildInfoCollector {
    pub fn new(program: &str) -> prometheus::Result<Self> {
        let opts = Opts::new(
            "build_info",
            format!(
                "A metric with a constant '1' value labeled by version, revision, branch, \
                 and rustversion from which {program} was built."
            ),
        )
        .namespace(program);

        let info = GaugeVec::new(opts, &["branch", "revision", "rustversion", "version"])?;
        info.with_label_values(&[BRANCH, REVISION, RUST_VERSION, VERSION])
            .set(1.0);
        Ok(Self { info })
    }
}

impl Collector for BuildInfoCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.info.desc()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.info.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_metric() {
        let collector = BuildInfoCollector::new(PROGRAM).unwrap();
        let families = collector.collect();

        assert_eq!(families.len(), 1);
        assert_eq!(families[0].get_name(), "nodesnap_build_info");
        let metric = &families[0].get_metric()[0];
        assert_eq!(metric.get_gauge().get_value(), 1.0);

        let version = metric
            .get_label()
            .iter()
            .find(|l| l.get_name() == "version")
            .unwrap();
        assert_eq!(version.get_value(), VERSION);
    }

    #[test]
    fn test_info_strings() {
        assert!(info().starts_with(&format!("(version={VERSION}, ")));
        assert!(build_context().contains(&format!("rustc={RUST_VERSION}")));
        assert!(LONG_VERSION.starts_with(VERSION));
    }
}
