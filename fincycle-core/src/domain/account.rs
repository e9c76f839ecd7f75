//! Account state — the mutable financial state carried across cycles.
//!
//! Mutated exclusively by cash-flow synthesis, investment execution, and
//! valuation updates inside the cycle engine. `reset()` restores the initial
//! balance and clears every time series; it is idempotent.

use serde::{Deserialize, Serialize};

/// Bank balance, cash-flow samples, and the per-cycle time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: f64,
    pub base_income: f64,
    pub base_expense: f64,
    pub income_history: Vec<f64>,
    pub expense_history: Vec<f64>,
    /// Seeded with the initial balance; appended after every mutation batch.
    pub balance_history: Vec<f64>,
    pub sip_history: Vec<f64>,
    pub lumpsum_history: Vec<f64>,
    pub nav_history: Vec<f64>,
    /// Cumulative currency moved into the ledger.
    pub invested_amount: f64,
    /// Most recent recurring-contribution suggestion.
    pub last_suggested_sip: f64,
    /// Amount actually invested in the most recent cycle (0 when passive).
    pub last_invest_amount: f64,
    initial_balance: f64,
}

impl AccountState {
    pub fn new(initial_balance: f64, base_income: f64, base_expense: f64) -> Self {
        Self {
            balance: initial_balance,
            base_income,
            base_expense,
            income_history: Vec::new(),
            expense_history: Vec::new(),
            balance_history: vec![initial_balance],
            sip_history: Vec::new(),
            lumpsum_history: Vec::new(),
            nav_history: Vec::new(),
            invested_amount: 0.0,
            last_suggested_sip: 0.0,
            last_invest_amount: 0.0,
            initial_balance,
        }
    }

    /// Restore the initial balance and clear every series and counter. The
    /// cash-flow base means are configuration, not state, and survive.
    pub fn reset(&mut self) {
        self.balance = self.initial_balance;
        self.income_history.clear();
        self.expense_history.clear();
        self.balance_history = vec![self.initial_balance];
        self.sip_history.clear();
        self.lumpsum_history.clear();
        self.nav_history.clear();
        self.invested_amount = 0.0;
        self.last_suggested_sip = 0.0;
        self.last_invest_amount = 0.0;
    }

    /// Most recent income sample (0 before the first cycle).
    pub fn last_income(&self) -> f64 {
        self.income_history.last().copied().unwrap_or(0.0)
    }

    /// Most recent expense sample (0 before the first cycle).
    pub fn last_expense(&self) -> f64 {
        self.expense_history.last().copied().unwrap_or(0.0)
    }

    pub fn total_inflow(&self) -> f64 {
        self.income_history.iter().sum()
    }

    pub fn total_outflow(&self) -> f64 {
        self.expense_history.iter().sum()
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirty_account() -> AccountState {
        let mut account = AccountState::new(10_000.0, 5_000.0, 3_000.0);
        account.balance = 7_500.0;
        account.income_history.push(4_800.0);
        account.expense_history.push(3_100.0);
        account.balance_history.push(7_500.0);
        account.sip_history.push(150.0);
        account.lumpsum_history.push(0.0);
        account.nav_history.push(150.0);
        account.invested_amount = 150.0;
        account.last_suggested_sip = 150.0;
        account.last_invest_amount = 150.0;
        account
    }

    #[test]
    fn new_account_shape() {
        let account = AccountState::new(10_000.0, 5_000.0, 3_000.0);
        assert_eq!(account.balance, 10_000.0);
        assert_eq!(account.balance_history, vec![10_000.0]);
        assert_eq!(account.last_income(), 0.0);
        assert_eq!(account.last_expense(), 0.0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut account = dirty_account();
        account.reset();
        assert_eq!(account, AccountState::new(10_000.0, 5_000.0, 3_000.0));
    }

    #[test]
    fn reset_is_idempotent() {
        let mut account = dirty_account();
        account.reset();
        let once = account.clone();
        account.reset();
        assert_eq!(account, once);
    }

    #[test]
    fn flow_totals() {
        let mut account = AccountState::new(10_000.0, 5_000.0, 3_000.0);
        account.income_history.extend([100.0, 200.0]);
        account.expense_history.extend([50.0, 75.0]);
        assert_eq!(account.total_inflow(), 300.0);
        assert_eq!(account.total_outflow(), 125.0);
        assert_eq!(account.last_income(), 200.0);
        assert_eq!(account.last_expense(), 75.0);
    }
}
