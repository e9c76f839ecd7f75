//! Multi-cycle simulation driver.
//!
//! Wires the engine to its persistence collaborators, drives N cycles, and
//! folds the outputs into a `RunSummary`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fincycle_core::domain::CycleOutput;
use fincycle_core::engine::CycleEngine;
use fincycle_core::sink::{CycleSink, SinkError, TransactionSink};

use crate::artifacts::{save_summary, CsvTransactionLog, JsonlCycleLog};
use crate::config::{ConfigError, RunConfig};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("artifact error: {0}")]
    Artifact(#[from] SinkError),
}

/// Aggregate outcome of a driven run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub cycles: u64,
    pub master_seed: Option<u64>,
    pub total_reward: f64,
    pub mean_reward: f64,
    pub final_balance: f64,
    /// NAV (ledger value) after the last cycle.
    pub final_nav: f64,
    /// Bank balance + ledger value after the last cycle.
    pub final_total_value: f64,
    pub invested_amount: f64,
    /// Cycles per planned action, keyed by action name.
    pub action_counts: BTreeMap<String, u64>,
    /// Cycles whose persistence collaborators reported failures.
    pub degraded_cycles: u64,
}

impl RunSummary {
    fn from_outputs(engine: &CycleEngine, outputs: &[CycleOutput]) -> Self {
        let total_reward: f64 = outputs.iter().map(|o| o.reward).sum();
        let mut action_counts = BTreeMap::new();
        for output in outputs {
            *action_counts
                .entry(output.plan.action.as_str().to_string())
                .or_insert(0) += 1;
        }

        let summary = engine.portfolio_summary();
        let account = engine.account();

        Self {
            cycles: outputs.len() as u64,
            master_seed: engine.config().seed,
            total_reward,
            mean_reward: if outputs.is_empty() {
                0.0
            } else {
                total_reward / outputs.len() as f64
            },
            final_balance: account.balance,
            final_nav: account.nav_history.last().copied().unwrap_or(0.0),
            final_total_value: summary.total_value,
            invested_amount: account.invested_amount,
            action_counts,
            degraded_cycles: outputs.iter().filter(|o| o.is_degraded()).count() as u64,
        }
    }
}

/// Drive `config.cycles` cycles against the given sinks.
pub fn run_simulation(
    config: &RunConfig,
    tx_sink: Arc<dyn TransactionSink>,
    cycle_sink: Arc<dyn CycleSink>,
) -> Result<RunSummary, DriverError> {
    config.validate()?;

    let mut engine = CycleEngine::with_sinks(config.sim.clone(), tx_sink, cycle_sink);
    let outputs: Vec<CycleOutput> = (0..config.cycles).map(|_| engine.run_cycle()).collect();
    Ok(RunSummary::from_outputs(&engine, &outputs))
}

/// Drive a run with file-backed artifacts in `output_dir`:
/// `cycles.jsonl`, `transactions.csv`, and `summary.json`.
pub fn run_to_artifacts(config: &RunConfig, output_dir: &Path) -> Result<RunSummary, DriverError> {
    let cycle_log = Arc::new(JsonlCycleLog::create(output_dir.join("cycles.jsonl"))?);
    let tx_log = Arc::new(CsvTransactionLog::create(output_dir.join("transactions.csv"))?);

    let summary = run_simulation(config, tx_log, cycle_log)?;
    save_summary(&output_dir.join("summary.json"), &summary)?;
    Ok(summary)
}
