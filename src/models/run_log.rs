//! Run log entries
//!
//! One entry per configured item per run. Entries are written to the run's
//! own CSV file and are never read back.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of one item in one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Exported, committed and verified
    #[serde(rename = "success")]
    Success,
    /// Attempted this run without a verified archive
    #[serde(rename = "fail")]
    Fail,
    /// Not stale, left alone
    #[serde(rename = "skipped-fresh")]
    SkippedFresh,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Fail => write!(f, "fail"),
            RunStatus::SkippedFresh => write!(f, "skipped-fresh"),
        }
    }
}

/// A row of the run log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub item_id: String,
    pub item_name: String,
    pub item_title: String,
    pub zip_path: String,
    pub status: RunStatus,
}

impl RunLogEntry {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}
