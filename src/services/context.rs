//! Per-run context
//!
//! Everything derived from "now" is computed once when a run starts and
//! passed to each component explicitly.

use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::config::BackupPaths;
use crate::models::ItemMetadata;

/// Format of the run stamp used in directory and file names
pub const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Immutable facts about one run
#[derive(Debug, Clone)]
pub struct RunContext {
    /// When the run started
    pub started_at: DateTime<Local>,
    /// Run start in epoch milliseconds, recorded as `backup_ts` on success
    pub run_ts: i64,
    /// Run start as `YYYYMMDD_HHMMSS`, used in paths
    pub stamp: String,
    /// Output layout
    pub paths: BackupPaths,
    /// Back up every item regardless of the ledger
    pub full_backup: bool,
}

impl RunContext {
    /// Context for a run starting now
    pub fn new(paths: BackupPaths, full_backup: bool) -> Self {
        Self::at(Local::now(), paths, full_backup)
    }

    /// Context for a run starting at a given time
    pub fn at(started_at: DateTime<Local>, paths: BackupPaths, full_backup: bool) -> Self {
        Self {
            run_ts: started_at.timestamp_millis(),
            stamp: started_at.format(RUN_STAMP_FORMAT).to_string(),
            started_at,
            paths,
            full_backup,
        }
    }

    /// Working directory for one item in this run
    pub fn work_dir(&self, item: &ItemMetadata) -> PathBuf {
        self.paths.work_dir(&item.title, &item.id, &self.stamp)
    }

    /// Where an item's archive lands once committed
    pub fn archive_path(&self, item: &ItemMetadata) -> PathBuf {
        self.paths.archive_path(&item.title, &item.id, &self.stamp)
    }

    /// Replica name sent to the server
    pub fn replica_name(&self, title: &str) -> String {
        format!("{}_{}", title, self.stamp)
    }

    pub fn run_log_file(&self) -> PathBuf {
        self.paths.run_log_file(&self.stamp)
    }

    pub fn error_log_file(&self) -> PathBuf {
        self.paths.error_log_file(&self.stamp)
    }
}
