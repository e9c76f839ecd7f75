//! Collaborator boundaries: the transaction log and the cycle audit sink.
//!
//! The engine never performs blocking I/O itself; durable storage is the
//! collaborator's problem, invoked only at the record-append boundary. A
//! sink failure must never abort an in-memory cycle — the engine surfaces it
//! as a degraded response instead.

use std::sync::Mutex;

use thiserror::Error;

use crate::domain::{CycleRecord, Transaction};

/// Failure writing to a persistence collaborator.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Append-only log of individual cash movements.
pub trait TransactionSink: Send + Sync {
    fn append(&self, tx: &Transaction) -> Result<(), SinkError>;

    /// Drop everything recorded so far. Default is a no-op for sinks that
    /// cannot truncate.
    fn reset(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Append-only audit log of completed cycles.
pub trait CycleSink: Send + Sync {
    fn record(&self, record: &CycleRecord) -> Result<(), SinkError>;

    fn reset(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    transactions: Vec<Transaction>,
    cycles: Vec<CycleRecord>,
}

/// In-memory sink implementing both collaborator traits.
///
/// Used by tests and by callers that want to read transactions and cycle
/// records back without a storage layer. Writes never fail.
#[derive(Debug, Default)]
pub struct MemorySink {
    inner: Mutex<MemoryInner>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock().transactions.clone()
    }

    pub fn cycles(&self) -> Vec<CycleRecord> {
        self.lock().cycles.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        // A poisoned lock only means a panicking writer; the data is still
        // sound for an append-only log.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TransactionSink for MemorySink {
    fn append(&self, tx: &Transaction) -> Result<(), SinkError> {
        self.lock().transactions.push(tx.clone());
        Ok(())
    }

    fn reset(&self) -> Result<(), SinkError> {
        self.lock().transactions.clear();
        Ok(())
    }
}

impl CycleSink for MemorySink {
    fn record(&self, record: &CycleRecord) -> Result<(), SinkError> {
        self.lock().cycles.push(record.clone());
        Ok(())
    }

    fn reset(&self) -> Result<(), SinkError> {
        self.lock().cycles.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TransactionCategory, TransactionKind};
    use chrono::Utc;

    fn tx(amount: f64) -> Transaction {
        Transaction {
            timestamp: Utc::now(),
            kind: TransactionKind::Income,
            category: TransactionCategory::Income,
            amount,
            description: "unstable income".to_string(),
            balance_after: 10_000.0 + amount,
        }
    }

    #[test]
    fn memory_sink_appends_and_reads_back() {
        let sink = MemorySink::new();
        sink.append(&tx(100.0)).unwrap();
        sink.append(&tx(200.0)).unwrap();
        let recorded = sink.transactions();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[1].amount, 200.0);
    }

    #[test]
    fn memory_sink_reset_clears() {
        let sink = MemorySink::new();
        sink.append(&tx(100.0)).unwrap();
        TransactionSink::reset(&sink).unwrap();
        assert!(sink.transactions().is_empty());
    }
}
