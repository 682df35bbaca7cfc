//! One complete run: build collectors, register them, write the snapshot.
//!
//! The stages are strictly sequential and every failure is terminal. Errors
//! are logged here and returned so the binary only has to pick an exit status.

use prometheus::Registry;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::collector::{CollectorError, NodeCollector};
use crate::config::Config;
use crate::export::{self, ExportError, ExportSummary};
use crate::version::{self, BuildInfoCollector, PROGRAM};

/// A fatal failure, named after the stage it happened in.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid arguments: {0}")]
    Configuration(#[source] clap::Error),

    #[error("couldn't create collector: {0}")]
    Construction(#[source] CollectorError),

    #[error("couldn't register node collector: {0}")]
    Registration(#[source] prometheus::Error),

    #[error("collection failed: {0}")]
    Export(#[source] ExportError),
}

/// Runs once with `config`, obtaining the collector set from `build`.
///
/// Nothing is written to `config.metrics_output` unless construction and
/// registration both succeed.
pub fn run<B>(config: &Config, build: B) -> Result<ExportSummary, RunError>
where
    B: FnOnce(&Config) -> Result<NodeCollector, CollectorError>,
{
    info!("Starting {} {}", PROGRAM, version::info());
    info!("Build context {}", version::build_context());

    let node = build(config).map_err(|e| fatal(RunError::Construction(e)))?;

    info!("Enabled collectors:");
    for name in node.collector_names() {
        info!(" - {}", name);
    }

    let registry = Registry::new();
    BuildInfoCollector::new(PROGRAM)
        .and_then(|info| registry.register(Box::new(info)))
        .map_err(|e| fatal(RunError::Registration(e)))?;
    registry
        .register(Box::new(node))
        .map_err(|e| fatal(RunError::Registration(e)))?;

    info!("Collecting metrics...");
    let summary = export::write_to_textfile(&config.metrics_output, &registry)
        .map_err(|e| fatal(RunError::Export(e)))?;
    debug!(
        "Wrote {} families, {} samples to {}",
        summary.families,
        summary.samples,
        summary.path.display()
    );

    info!("Done");
    Ok(summary)
}

fn fatal(e: RunError) -> RunError {
    error!("{e}");
    e
}
