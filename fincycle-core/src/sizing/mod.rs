//! Sizing policy — the single authority on how much to invest and whether a
//! lump-sum opportunity exists.
//!
//! Combines the trading signal, volatility regime, emergency-buffer rule,
//! and risk-profile coefficients into one decision. The recurring ("SIP")
//! amount is always computed and reported, even when the decision is not to
//! invest, so presentation layers can show the suggestion independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ContributionMode, RiskParams, StateSnapshot};
use crate::market::MarketProcess;
use crate::signals::{Signal, SignalAnalyzer, SignalConfig, SignalSnapshot};

/// Income fraction feeding the base contribution.
const INCOME_FRACTION: f64 = 0.03;

/// Cash fraction feeding the base contribution.
const CASH_FRACTION: f64 = 0.02;

/// Contribution multiplier applied when volatility exceeds the profile
/// ceiling (dampening, not blocking).
const HIGH_VOL_DAMPING: f64 = 0.5;

/// Minimum confidence for a lump-sum upgrade.
const LUMPSUM_MIN_CONFIDENCE: u8 = 75;

/// The evaluator's full output for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentDecision {
    pub should_invest: bool,
    /// Amount to execute; 0 whenever `should_invest` is false.
    pub amount: f64,
    pub mode: ContributionMode,
    pub signal: Signal,
    pub confidence: u8,
    pub symbol: String,
    /// Raw recurring suggestion, independent of the decision.
    pub suggested_sip: f64,
}

/// Investment opportunity evaluator for one target instrument.
#[derive(Debug, Clone)]
pub struct SizingPolicy {
    symbol: String,
    analyzer: SignalAnalyzer,
}

impl SizingPolicy {
    pub fn new(symbol: &str, signal_config: SignalConfig) -> Self {
        Self {
            symbol: symbol.to_string(),
            analyzer: SignalAnalyzer::new(signal_config),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn analyzer(&self) -> &SignalAnalyzer {
        &self.analyzer
    }

    /// Periodic contribution size for the current account state.
    ///
    /// `base = max(3% income, 2% cash)`, capped so the emergency buffer is
    /// never eroded, scaled by the profile's SIP factor, and halved when
    /// volatility exceeds the profile ceiling. Never negative.
    pub fn recurring_contribution(&self, state: &StateSnapshot, params: &RiskParams) -> f64 {
        let base = (INCOME_FRACTION * state.income_rate).max(CASH_FRACTION * state.balance);
        let available = (state.balance - state.emergency_buffer).max(0.0);
        let mut contribution = base.min(available);

        contribution *= params.sip_factor;
        if state.volatility > params.max_vol {
            contribution *= HIGH_VOL_DAMPING;
        }
        contribution.max(0.0)
    }

    /// Evaluate the target instrument on the live market.
    pub fn evaluate(&self, state: &StateSnapshot, market: &MarketProcess) -> InvestmentDecision {
        self.evaluate_with_history(state, &market.history(&self.symbol))
    }

    /// Evaluate against an explicit price history (test seam and the
    /// building block of `evaluate`).
    pub fn evaluate_with_history(&self, state: &StateSnapshot, history: &[f64]) -> InvestmentDecision {
        let snapshot = self.analyzer.analyze(history);
        let forecast = self.analyzer.forecast(history);
        let last_price = history.last().copied().unwrap_or(forecast);
        self.decide(state, &snapshot, forecast, last_price)
    }

    fn decide(
        &self,
        state: &StateSnapshot,
        snapshot: &SignalSnapshot,
        forecast: f64,
        last_price: f64,
    ) -> InvestmentDecision {
        let params = state.risk_profile.params();
        let suggested_sip = self.recurring_contribution(state, &params);
        let trend_positive = forecast > last_price;

        let mut mode = ContributionMode::Sip;
        let mut amount = suggested_sip;
        let mut should_invest = suggested_sip > 0.0 && snapshot.volatility <= params.max_vol;

        // Lump-sum only on a strong buy with a positive trend, volatility
        // strictly under the ceiling, and a profile that permits it.
        if snapshot.signal == Signal::Buy
            && snapshot.confidence >= LUMPSUM_MIN_CONFIDENCE
            && trend_positive
            && snapshot.volatility < params.max_vol
            && params.lumpsum_factor > 0.0
        {
            mode = ContributionMode::LumpSum;
            amount = suggested_sip * params.lumpsum_factor;
            should_invest = amount > 0.0;
        }

        InvestmentDecision {
            should_invest,
            amount: if should_invest { amount.max(0.0) } else { 0.0 },
            mode: if should_invest { mode } else { ContributionMode::Sip },
            signal: snapshot.signal,
            confidence: snapshot.confidence,
            symbol: self.symbol.clone(),
            suggested_sip,
        }
    }
}
