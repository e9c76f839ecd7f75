//! Serializable run configuration loaded from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fincycle_core::config::SimConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A complete simulation run: how many cycles over which scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of cycles to drive.
    pub cycles: u64,
    /// Simulation scenario (balance, cash-flow bases, market universe…).
    pub sim: SimConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cycles: 30,
            sim: SimConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load and validate a TOML run configuration.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot sensibly run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycles == 0 {
            return Err(ConfigError::Invalid("cycles must be >= 1".to_string()));
        }
        if self.sim.initial_balance <= 0.0 {
            return Err(ConfigError::Invalid(
                "initial_balance must be positive".to_string(),
            ));
        }
        if self.sim.base_income < 0.0 || self.sim.base_expense < 0.0 {
            return Err(ConfigError::Invalid(
                "cash-flow bases must be non-negative".to_string(),
            ));
        }
        if self.sim.market.instruments.is_empty() {
            return Err(ConfigError::Invalid(
                "market needs at least one instrument".to_string(),
            ));
        }
        let default_known = self
            .sim
            .market
            .instruments
            .iter()
            .any(|spec| spec.symbol == self.sim.market.default_symbol);
        if !default_known {
            return Err(ConfigError::Invalid(format!(
                "default symbol {:?} is not a configured instrument",
                self.sim.market.default_symbol
            )));
        }
        let signal = &self.sim.signal;
        if signal.short_period == 0 || signal.long_period < signal.short_period {
            return Err(ConfigError::Invalid(
                "signal periods must satisfy 1 <= short <= long".to_string(),
            ));
        }
        if signal.forecast_window < 2 {
            return Err(ConfigError::Invalid(
                "forecast window must be >= 2".to_string(),
            ));
        }
        Ok(())
    }
}
