//! Per-cycle value objects: the observed state snapshot, the plan, the
//! execution result, and the immutable cycle record.
//!
//! Every consumer (planner, reward, persistence, presentation) reads these
//! named fields; there is no untyped key-value state passing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::portfolio::TradeResult;
use crate::domain::risk::RiskProfile;
use crate::signals::Signal;

/// How an investment is contributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionMode {
    /// Recurring periodic contribution.
    Sip,
    /// One-off opportunistic contribution on a strong signal.
    #[serde(rename = "lumpsum")]
    LumpSum,
}

impl ContributionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ContributionMode::Sip => "sip",
            ContributionMode::LumpSum => "lumpsum",
        }
    }
}

/// Merged account + market state observed at the start of planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub balance: f64,
    /// Most recent income sample.
    pub income_rate: f64,
    /// Most recent expense sample.
    pub expense_rate: f64,
    /// Realized volatility of the target instrument.
    pub volatility: f64,
    /// Bank balance + ledger value.
    pub portfolio_value: f64,
    /// Minimum cash reserve planning must not erode.
    pub emergency_buffer: f64,
    pub emergency_buffer_ok: bool,
    pub risk_profile: RiskProfile,
    /// Recurring contribution the sizing policy would suggest right now.
    pub suggested_sip: f64,
}

/// Action chosen by the planner for this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannedAction {
    Invest,
    Save,
    Repay,
    Hold,
}

impl PlannedAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PlannedAction::Invest => "invest",
            PlannedAction::Save => "save",
            PlannedAction::Repay => "repay",
            PlannedAction::Hold => "hold",
        }
    }
}

/// The planner's full output for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyclePlan {
    pub action: PlannedAction,
    pub invest_amount: f64,
    pub mode: ContributionMode,
    pub symbol: String,
    pub signal: Signal,
    pub confidence: u8,
    /// Suggested recurring amount, carried independently of the decision so
    /// callers can display it even when the plan is not to invest.
    pub suggested_sip: f64,
}

/// Terminal status of a cycle's execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecStatus {
    Filled,
    Noop,
    Failed,
    Saved,
    Repaid,
    Hold,
}

impl ExecStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecStatus::Filled => "filled",
            ExecStatus::Noop => "noop",
            ExecStatus::Failed => "failed",
            ExecStatus::Saved => "saved",
            ExecStatus::Repaid => "repaid",
            ExecStatus::Hold => "hold",
        }
    }
}

/// What actually happened when the plan was executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: ExecStatus,
    /// Cash moved by this cycle's execution (0 for save/hold).
    pub amount: f64,
    /// The ledger trade, when the action reached the ledger.
    pub trade: Option<TradeResult>,
}

impl ExecutionResult {
    pub fn passive(status: ExecStatus) -> Self {
        Self {
            status,
            amount: 0.0,
            trade: None,
        }
    }
}

/// Immutable append-only log entry produced once per cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub cycle_id: u64,
    pub timestamp: DateTime<Utc>,
    pub state: StateSnapshot,
    pub plan: CyclePlan,
    pub result: ExecutionResult,
    pub reward: f64,
}

/// Everything a caller gets back from one `run_cycle` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleOutput {
    pub cycle_id: u64,
    pub timestamp: DateTime<Utc>,
    pub state: StateSnapshot,
    pub plan: CyclePlan,
    pub result: ExecutionResult,
    pub reward: f64,
    /// Set when a persistence collaborator failed; the cycle itself still
    /// completed and its in-memory effects stand.
    pub persistence_error: Option<String>,
}

impl CycleOutput {
    pub fn is_degraded(&self) -> bool {
        self.persistence_error.is_some()
    }
}
