//! Transaction records handed to the transaction-log collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of cash movement a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Sip,
    #[serde(rename = "lumpsum")]
    LumpSum,
    PortfolioBuy,
    Repay,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Sip => "sip",
            TransactionKind::LumpSum => "lumpsum",
            TransactionKind::PortfolioBuy => "portfolio_buy",
            TransactionKind::Repay => "repay",
        }
    }
}

/// Reporting bucket for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionCategory {
    Income,
    Expense,
    Invest,
    Portfolio,
}

/// One append-only transaction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    pub category: TransactionCategory,
    pub amount: f64,
    pub description: String,
    /// Bank balance immediately after this transaction was applied.
    pub balance_after: f64,
}
