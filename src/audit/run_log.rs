//! Run log file
//!
//! One CSV per run, named after the run stamp, with one row per configured item.

use std::path::{Path, PathBuf};

use crate::error::BackupResult;
use crate::models::RunLogEntry;
use crate::storage::write_csv_atomic;

/// Run log columns, in `RunLogEntry` field order
pub const RUN_LOG_HEADERS: [&str; 5] = ["item_id", "item_name", "item_title", "zip_path", "status"];

/// Writes the run log for one run
#[derive(Debug, Clone)]
pub struct RunLogWriter {
    log_path: PathBuf,
}

impl RunLogWriter {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Write every entry, replacing any earlier file for the same run
    pub fn write(&self, entries: &[RunLogEntry]) -> BackupResult<()> {
        write_csv_atomic(&self.log_path, &RUN_LOG_HEADERS, entries)
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}
