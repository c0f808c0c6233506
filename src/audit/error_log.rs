//! Run-scoped error log
//!
//! Plain-text, append-only. Each failed item gets one timestamped record
//! followed by the full chain of error causes. The file is only created
//! once the first failure is recorded.

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{BackupError, BackupResult};

/// Writes per-item failure records for one run
#[derive(Debug, Clone)]
pub struct ErrorLog {
    /// Path to the error log file
    log_path: PathBuf,
}

impl ErrorLog {
    /// Create an ErrorLog that writes to the specified path
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append a failure record for one item
    ///
    /// Flushed immediately so a crash later in the run keeps the record.
    pub fn record(&self, item_id: &str, title: &str, error: &dyn Error) -> BackupResult<()> {
        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| BackupError::Io(format!("Failed to create log directory: {}", e)))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| BackupError::Io(format!("Failed to open error log: {}", e)))?;

        writeln!(
            file,
            "[{}] ERROR item {} ({}): {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
            item_id,
            title,
            error
        )
        .map_err(|e| BackupError::Io(format!("Failed to write error log: {}", e)))?;

        let mut source = error.source();
        while let Some(cause) = source {
            writeln!(file, "    caused by: {}", cause)
                .map_err(|e| BackupError::Io(format!("Failed to write error log: {}", e)))?;
            source = cause.source();
        }

        file.flush()
            .map_err(|e| BackupError::Io(format!("Failed to flush error log: {}", e)))?;

        Ok(())
    }

    /// Check if anything has been logged yet
    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    /// Get the path to the error log file
    pub fn path(&self) -> &Path {
        &self.log_path
    }
}
