// Rename history spooler
//
// Renames performed during a session are buffered in memory and committed
// to `history.yaml` in one synchronous write, normally when the main window
// closes.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

/// User setting enabling persisted history
pub const HISTORY_PERSISTENT_KEY: &str = "history.persistent";

/// One renamed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRecord {
    pub from: Utf8PathBuf,
    pub to: Utf8PathBuf,
    /// Seconds since the unix epoch
    pub renamed_at: u64,
}

static SPOOLER: OnceLock<HistorySpooler> = OnceLock::new();

/// Buffers rename records and commits them to the history file
#[derive(Debug)]
pub struct HistorySpooler {
    path: Utf8PathBuf,
    persistent: AtomicBool,
    session: Mutex<Vec<RenameRecord>>,
    persisted: AtomicUsize,
}

impl HistorySpooler {
    /// Create a spooler for `path`, counting already persisted records
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        let path = path.into();
        let persisted = match read_history(&path) {
            Ok(records) => records.len(),
            Err(e) => {
                tracing::warn!("Failed to read history {}: {:#}", path, e);
                0
            }
        };

        Self {
            path,
            persistent: AtomicBool::new(true),
            session: Mutex::new(Vec::new()),
            persisted: AtomicUsize::new(persisted),
        }
    }

    /// Install the process-wide spooler; later calls return the first one
    pub fn initialize(path: &Utf8Path) -> &'static HistorySpooler {
        SPOOLER.get_or_init(|| HistorySpooler::new(path))
    }

    pub fn get() -> Option<&'static HistorySpooler> {
        SPOOLER.get()
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn set_persistent_history_enabled(&self, enabled: bool) {
        self.persistent.store(enabled, Ordering::Release);
    }

    pub fn is_persistent_history_enabled(&self) -> bool {
        self.persistent.load(Ordering::Acquire)
    }

    pub fn append(&self, records: impl IntoIterator<Item = RenameRecord>) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        session.extend(records);
    }

    /// Records buffered since the last commit
    pub fn pending(&self) -> usize {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Write buffered records to disk.
    ///
    /// Returns the number of records written. With persistence disabled the
    /// buffer is discarded. On error the buffer is left intact so a later
    /// commit can retry.
    pub fn commit(&self) -> Result<usize> {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.is_empty() {
            return Ok(0);
        }

        if !self.is_persistent_history_enabled() {
            tracing::debug!("Discarding {} history records", session.len());
            session.clear();
            return Ok(0);
        }

        let total = self.write_appended(&session)?;
        let written = session.len();
        session.clear();

        self.persisted.store(total, Ordering::Release);
        tracing::debug!("Committed {} history records", written);
        Ok(written)
    }

    fn write_appended(&self, records: &[RenameRecord]) -> Result<usize> {
        let mut history = read_history(&self.path)?;
        history.extend_from_slice(records);

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create history directory: {}", parent))?;

        let yaml = serde_yaml_ng::to_string(&history).context("Failed to serialize history")?;
        let mut staging = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to stage history in {}", parent))?;
        staging
            .write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write history: {}", self.path))?;
        staging
            .persist(&self.path)
            .with_context(|| format!("Failed to replace history: {}", self.path))?;

        Ok(history.len())
    }

    /// Number of records in the history file
    pub fn total_count(&self) -> usize {
        self.persisted.load(Ordering::Acquire)
    }

    /// All persisted records, oldest first
    pub fn load(&self) -> Result<Vec<RenameRecord>> {
        read_history(&self.path)
    }
}

fn read_history(path: &Utf8Path) -> Result<Vec<RenameRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read history: {}", path))?;
    let records: Option<Vec<RenameRecord>> = serde_yaml_ng::from_str(&contents)
        .with_context(|| format!("Failed to parse history: {}", path))?;

    Ok(records.unwrap_or_default())
}
