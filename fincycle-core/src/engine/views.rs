//! Read-only views served to presentation layers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::market::MarketMetrics;

/// Aggregate portfolio view: bank cash plus ledger holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Bank balance (uninvested liquidity).
    pub cash: f64,
    pub positions: HashMap<String, f64>,
    /// Bank balance + ledger value.
    pub total_value: f64,
    pub invested_amount: f64,
    pub absolute_pnl: f64,
    /// Percent P&L relative to the cumulative invested amount.
    pub pnl_pct: f64,
    /// NAV change over the most recent cycle.
    pub cycle_pnl: f64,
    pub suggested_sip: f64,
    pub total_inflow: f64,
    pub total_outflow: f64,
}

/// Market metrics merged with the account's per-cycle series, for charting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketView {
    pub symbol: String,
    pub metrics: MarketMetrics,
    pub nav_history: Vec<f64>,
    pub sip_history: Vec<f64>,
    pub lumpsum_history: Vec<f64>,
    pub income_history: Vec<f64>,
    pub expense_history: Vec<f64>,
    pub balance_history: Vec<f64>,
}
