//! Simulation configuration.
//!
//! All knobs the cycle engine needs, serializable so the runner can load
//! them from TOML. Defaults reproduce the reference scenario: a 10k starting
//! balance, 5k/3k cash-flow bases, and a three-instrument market.

use serde::{Deserialize, Serialize};

use crate::market::MarketConfig;
use crate::signals::SignalConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Starting (and post-reset) bank balance.
    pub initial_balance: f64,
    /// Mean of the per-cycle income draw (std = 30% of this).
    pub base_income: f64,
    /// Mean of the per-cycle expense draw (std = 20% of this).
    pub base_expense: f64,
    /// Emergency buffer = this many times the last expense sample.
    pub emergency_buffer_factor: f64,
    /// Instrument the sizing policy targets.
    pub target_symbol: String,
    /// Master seed for all random streams; `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub market: MarketConfig,
    pub signal: SignalConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            base_income: 5_000.0,
            base_expense: 3_000.0,
            emergency_buffer_factor: 3.0,
            target_symbol: "INDEX".to_string(),
            seed: None,
            market: MarketConfig::default(),
            signal: SignalConfig::default(),
        }
    }
}

impl SimConfig {
    /// Defaults with a fixed seed — the reproducible variant used by tests
    /// and benchmarks.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}
