//! Run log and ledger commit
//!
//! Turns per-item outcomes into run log entries, writes the run log, and
//! merges verified backups into the ledger. Persistence failures are
//! reported but never undo the in-memory result.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{error, info};

use crate::audit::RunLogWriter;
use crate::error::ItemFailure;
use crate::models::{BackupStamp, RecordPatch, RunLogEntry, RunStatus};
use crate::storage::{Ledger, LedgerStore};

use super::context::RunContext;

/// What happened to one configured item this run
#[derive(Debug)]
pub enum ItemOutcome {
    /// Not stale; nothing attempted
    Fresh,
    /// Exported, moved into place and verified
    BackedUp { archive: PathBuf },
    /// Attempted without a verified archive
    Failed {
        failure: ItemFailure,
        /// Archive path the attempt would have produced, if known
        archive: Option<PathBuf>,
    },
}

/// Per-item result carried from the export loop to the committer
#[derive(Debug)]
pub struct ItemResult {
    pub item_id: String,
    pub item_name: String,
    pub item_title: String,
    pub outcome: ItemOutcome,
}

impl ItemResult {
    /// One run log row; fresh items report their last committed archive
    pub fn to_entry(&self, ledger: &Ledger) -> RunLogEntry {
        let (status, zip_path) = match &self.outcome {
            ItemOutcome::Fresh => (
                RunStatus::SkippedFresh,
                ledger
                    .get(&self.item_id)
                    .map(|r| r.zip_path.clone())
                    .unwrap_or_default(),
            ),
            ItemOutcome::BackedUp { archive } => {
                (RunStatus::Success, archive.display().to_string())
            }
            ItemOutcome::Failed { archive, .. } => (
                RunStatus::Fail,
                archive
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
        };

        RunLogEntry {
            item_id: self.item_id.clone(),
            item_name: self.item_name.clone(),
            item_title: self.item_title.clone(),
            zip_path,
            status,
        }
    }
}

/// Run log rows in configured order
///
/// Configured ids without a result (which the run loop never produces)
/// are reported as failures rather than dropped.
pub fn build_run_log(configured: &[String], results: &[ItemResult], ledger: &Ledger) -> Vec<RunLogEntry> {
    let by_id: HashMap<&str, &ItemResult> =
        results.iter().map(|r| (r.item_id.as_str(), r)).collect();

    configured
        .iter()
        .map(|id| match by_id.get(id.as_str()) {
            Some(result) => result.to_entry(ledger),
            None => RunLogEntry {
                item_id: id.clone(),
                item_name: String::new(),
                item_title: String::new(),
                zip_path: String::new(),
                status: RunStatus::Fail,
            },
        })
        .collect()
}

/// Ledger patches for every successful entry, stamped with the run start
pub fn success_patches(ctx: &RunContext, entries: &[RunLogEntry]) -> Vec<RecordPatch> {
    entries
        .iter()
        .filter(|e| e.is_success())
        .map(|e| RecordPatch {
            item_id: e.item_id.clone(),
            item_name: Some(e.item_name.clone()),
            item_title: Some(e.item_title.clone()),
            backup: Some(BackupStamp {
                backup_ts: ctx.run_ts,
                zip_path: e.zip_path.clone(),
            }),
            ..Default::default()
        })
        .collect()
}

/// Result of committing a run
#[derive(Debug, Clone)]
pub struct CommitReport {
    /// Ledger after merging this run's successes
    pub ledger: Ledger,
    pub run_log_saved: bool,
    pub ledger_saved: bool,
}

/// Writes the run log and folds successes into the ledger
pub struct Committer<'a> {
    store: &'a LedgerStore,
    run_log: RunLogWriter,
}

impl<'a> Committer<'a> {
    pub fn new(store: &'a LedgerStore, run_log: RunLogWriter) -> Self {
        Self { store, run_log }
    }

    /// Persist the run log, then merge and persist the ledger
    pub fn commit(&self, ctx: &RunContext, ledger: &Ledger, entries: &[RunLogEntry]) -> CommitReport {
        let run_log_saved = match self.run_log.write(entries) {
            Ok(()) => {
                info!(path = %self.run_log.path().display(), "Run log written");
                true
            }
            Err(e) => {
                error!(
                    path = %self.run_log.path().display(),
                    error = %e,
                    "Unable to write run log, check permissions for the folder"
                );
                false
            }
        };

        let patches = success_patches(ctx, entries);
        let ledger = ledger.merged(&patches);

        let ledger_saved = match self.store.save(&ledger) {
            Ok(()) => {
                info!(path = %self.store.path().display(), updated = patches.len(), "Ledger updated");
                true
            }
            Err(e) => {
                error!(
                    path = %self.store.path().display(),
                    error = %e,
                    "Unable to write ledger, is it open in another program?"
                );
                false
            }
        };

        CommitReport {
            ledger,
            run_log_saved,
            ledger_saved,
        }
    }
}
