//! nodesnap - writes one snapshot of node metrics to a file and exits.
//!
//! Collects host metrics from the /proc filesystem, encodes them in the text
//! exposition format and atomically replaces the output file.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::process::ExitCode;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use nodesnap_core::collector::{NodeCollector, RealFs};
use nodesnap_core::config::{LogConfig, LogFormat};
use nodesnap_core::{Config, RunError, run};

/// Installs the global subscriber writing to stderr.
/// `RUST_LOG` directives are honored on top of `--log.level`.
fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::from_default_env().add_directive(log.level.as_filter().into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match log.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn main() -> ExitCode {
    let config = match Config::from_args(std::env::args_os()) {
        Ok(config) => config,
        // Prints usage, help or version and exits with clap's status code.
        Err(RunError::Configuration(e)) => e.exit(),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.log);
    debug!("Config: {:?}", config);

    // The orchestrator has already logged the failing stage and its cause.
    match run(&config, |c| NodeCollector::new(RealFs::new(), &c.collectors)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
