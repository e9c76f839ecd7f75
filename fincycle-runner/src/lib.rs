//! FinCycle Runner — simulation orchestration on top of `fincycle-core`.
//!
//! This crate provides:
//! - TOML run configuration with validation
//! - A multi-cycle driver that folds cycle outputs into a run summary
//! - File-backed persistence collaborators (JSONL cycle log, CSV
//!   transaction log) and a JSON summary artifact

pub mod artifacts;
pub mod config;
pub mod driver;

pub use artifacts::{save_summary, CsvTransactionLog, JsonlCycleLog};
pub use config::{ConfigError, RunConfig};
pub use driver::{run_simulation, run_to_artifacts, DriverError, RunSummary};
