//! Command-line configuration.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::collector::CollectorArgs;
use crate::run::RunError;
use crate::version::{LONG_VERSION, VERSION};

/// Writes one snapshot of node metrics to a file and exits.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "nodesnap", version = VERSION, long_version = LONG_VERSION)]
pub struct Config {
    /// Where to write the metrics snapshot.
    #[arg(long = "metrics.output", value_name = "PATH", default_value = "./metrics.out")]
    pub metrics_output: PathBuf,

    #[command(flatten)]
    pub collectors: CollectorArgs,

    #[command(flatten)]
    pub log: LogConfig,
}

impl Config {
    /// Parses `args`, where the first item is the program name.
    pub fn from_args<I, T>(args: I) -> Result<Self, RunError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(RunError::Configuration)
    }
}

/// Logging settings.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Only log messages with the given severity or above.
    #[arg(long = "log.level", value_enum, default_value_t = LogLevel::Info)]
    pub level: LogLevel,

    /// Output format of log messages.
    #[arg(long = "log.format", value_enum, default_value_t = LogFormat::Text)]
    pub format: LogFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}
