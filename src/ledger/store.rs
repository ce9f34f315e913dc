//! Ledger Snapshot Persistence
//!
//! Saves the full ledger state (records, gates, change feed) as pretty JSON
//! so reputation survives a restart. Derived lookup keys are rebuilt on
//! restore, not stored.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use super::state::LedgerSnapshot;

const SNAPSHOT_FILE_NAME: &str = "reputation_ledger.json";

/// Default snapshot location under the platform data directory
pub fn default_snapshot_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(crate::constants::APP_NAME)
        .join(SNAPSHOT_FILE_NAME)
}

pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default_path() -> Self {
        Self::new(default_snapshot_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save a snapshot to disk, creating parent directories as needed.
    pub fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, snapshot)?;

        log::debug!(
            "Saved ledger snapshot: {} records, {} events",
            snapshot.records.len(),
            snapshot.feed.len()
        );
        Ok(())
    }

    /// Load a snapshot; `None` when no file exists yet.
    pub fn load(&self) -> Result<Option<LedgerSnapshot>, Box<dyn std::error::Error>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let snapshot: LedgerSnapshot = serde_json::from_reader(reader)?;

        log::info!("Loaded ledger snapshot with {} records", snapshot.records.len());
        Ok(Some(snapshot))
    }
}

// ============================================================================
// TESTS
// ============================================================================
