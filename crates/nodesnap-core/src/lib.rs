//! nodesnap-core: library behind the `nodesnap` binary.
//!
//! Provides:
//! - `collector`: host metrics collectors and the named collector set
//! - `config`: command-line configuration
//! - `export`: atomic text exposition snapshot writer
//! - `run`: one complete collect-and-export run
//! - `version`: build metadata and the build-info metric

pub mod collector;
pub mod config;
pub mod export;
pub mod run;
pub mod version;

pub use config::Config;
pub use export::ExportSummary;
pub use run::{RunError, run};
