//! File-backed persistence collaborators and run artifacts.
//!
//! - `JsonlCycleLog`: one JSON object per line, append-only. Each line is an
//!   independent document, so the format survives partial writes and can be
//!   streamed.
//! - `CsvTransactionLog`: flat CSV of every cash movement.
//! - `save_summary`: pretty-printed JSON of the final `RunSummary`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fincycle_core::domain::{CycleRecord, Transaction};
use fincycle_core::sink::{CycleSink, SinkError, TransactionSink};

use crate::driver::RunSummary;

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn open_append(path: &Path) -> std::io::Result<File> {
    ensure_parent(path)?;
    OpenOptions::new().create(true).append(true).open(path)
}

/// Append-only JSONL audit log of cycle records.
pub struct JsonlCycleLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlCycleLog {
    pub fn create(path: PathBuf) -> Result<Self, SinkError> {
        let file = open_append(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CycleSink for JsonlCycleLog {
    fn record(&self, record: &CycleRecord) -> Result<(), SinkError> {
        let line = serde_json::to_string(record)?;
        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(file, "{line}")?;
        file.flush()?;
        Ok(())
    }

    fn reset(&self) -> Result<(), SinkError> {
        let truncated = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *file = truncated;
        Ok(())
    }
}

/// CSV log of every transaction the engine emits.
pub struct CsvTransactionLog {
    path: PathBuf,
    writer: Mutex<csv::Writer<File>>,
}

impl CsvTransactionLog {
    pub fn create(path: PathBuf) -> Result<Self, SinkError> {
        ensure_parent(&path)?;
        let writer = csv::Writer::from_writer(File::create(&path)?);
        Ok(Self {
            path,
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TransactionSink for CsvTransactionLog {
    fn append(&self, tx: &Transaction) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writer
            .serialize(tx)
            .map_err(|err| SinkError::Io(std::io::Error::other(err)))?;
        writer.flush()?;
        Ok(())
    }

    fn reset(&self) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *writer = csv::Writer::from_writer(File::create(&self.path)?);
        Ok(())
    }
}

/// Write the run summary as pretty JSON.
pub fn save_summary(path: &Path, summary: &RunSummary) -> Result<(), SinkError> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json)?;
    Ok(())
}
