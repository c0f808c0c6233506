//! Backup run pipeline
//!
//! Load ledger, fetch metadata, classify, export and verify each stale item
//! in turn, then commit. Items are processed sequentially and a failure is
//! contained to the item it belongs to.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::audit::{ErrorLog, RunLogWriter};
use crate::error::ItemFailure;
use crate::models::{ItemMetadata, RunLogEntry, RunStatus};
use crate::portal::{Catalog, Exporter};
use crate::storage::{Ledger, LedgerStore};

use super::classifier::classify;
use super::committer::{build_run_log, Committer, ItemOutcome, ItemResult};
use super::context::RunContext;
use super::orchestrator::ExportOrchestrator;
use super::verifier::verify_archive;

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// One entry per configured item, in configured order
    pub entries: Vec<RunLogEntry>,
    /// Whether every item was treated as stale
    pub full_backup: bool,
    /// Ledger as it stands after the run
    pub ledger: Ledger,
    pub run_log_path: PathBuf,
    /// Present only if at least one failure was recorded
    pub error_log_path: Option<PathBuf>,
    pub run_log_saved: bool,
    pub ledger_saved: bool,
}

impl RunSummary {
    /// Summary of a run with nothing to do
    pub fn empty(ctx: &RunContext) -> Self {
        Self {
            entries: Vec::new(),
            full_backup: ctx.full_backup,
            ledger: Ledger::new(),
            run_log_path: ctx.run_log_file(),
            error_log_path: None,
            run_log_saved: false,
            ledger_saved: false,
        }
    }

    fn count(&self, status: RunStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(RunStatus::Success)
    }

    pub fn failed(&self) -> usize {
        self.count(RunStatus::Fail)
    }

    pub fn skipped(&self) -> usize {
        self.count(RunStatus::SkippedFresh)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One backup run over a catalog and an exporter
pub struct BackupRun<'a, C: Catalog, E: Exporter> {
    catalog: &'a C,
    exporter: &'a E,
}

impl<'a, C: Catalog, E: Exporter> BackupRun<'a, C, E> {
    pub fn new(catalog: &'a C, exporter: &'a E) -> Self {
        Self { catalog, exporter }
    }

    /// Back up the configured items
    ///
    /// An empty item list returns an empty summary without touching disk.
    pub fn execute(&self, ctx: &RunContext, item_ids: &[String]) -> RunSummary {
        let store = LedgerStore::new(ctx.paths.ledger_file());
        let run_log = RunLogWriter::new(ctx.run_log_file());
        let error_log = ErrorLog::new(ctx.error_log_file());

        if item_ids.is_empty() {
            info!("No items configured, nothing to back up");
            return RunSummary::empty(ctx);
        }

        if let Err(e) = ctx.paths.ensure_directories() {
            warn!(error = %e, "Unable to prepare output directories");
        }

        let loaded = store.load();

        let mut results: Vec<ItemResult> = Vec::with_capacity(item_ids.len());
        let mut items: Vec<ItemMetadata> = Vec::with_capacity(item_ids.len());

        for item_id in item_ids {
            match self.catalog.item(item_id) {
                Ok(item) => items.push(item),
                Err(e) => {
                    if e.is_not_found() {
                        warn!(item_id = %item_id, "Item is not in the catalog, check the item list");
                    }
                    let failure = ItemFailure::Lookup(e);
                    record_failure(&error_log, item_id, "", &failure);
                    results.push(ItemResult {
                        item_id: item_id.clone(),
                        item_name: String::new(),
                        item_title: String::new(),
                        outcome: ItemOutcome::Failed {
                            failure,
                            archive: None,
                        },
                    });
                }
            }
        }

        let classification = classify(&items, &loaded, ctx.full_backup);

        // Track newly seen items even if the run dies during export
        if let Err(e) = store.save(&classification.ledger) {
            error!(path = %store.path().display(), error = %e, "Unable to write ledger");
        }

        let orchestrator = ExportOrchestrator::new(self.exporter);

        for item in &items {
            let outcome = if classification.is_stale(&item.id) {
                self.backup_item(ctx, &orchestrator, &error_log, item)
            } else {
                info!(title = %item.title, "Backup still fresh, skipping");
                ItemOutcome::Fresh
            };

            results.push(ItemResult {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                item_title: item.title.clone(),
                outcome,
            });
        }

        let entries = build_run_log(item_ids, &results, &classification.ledger);
        let report = Committer::new(&store, run_log.clone()).commit(ctx, &classification.ledger, &entries);

        RunSummary {
            entries,
            full_backup: classification.full_backup,
            ledger: report.ledger,
            run_log_path: run_log.path().to_path_buf(),
            error_log_path: error_log.exists().then(|| error_log.path().to_path_buf()),
            run_log_saved: report.run_log_saved,
            ledger_saved: report.ledger_saved,
        }
    }

    /// Export, move and verify one stale item
    fn backup_item(
        &self,
        ctx: &RunContext,
        orchestrator: &ExportOrchestrator<'_, E>,
        error_log: &ErrorLog,
        item: &ItemMetadata,
    ) -> ItemOutcome {
        let attempted = ctx.archive_path(item);

        let result = orchestrator
            .export_item(ctx, item)
            .and_then(|archive| verify_archive(&archive).map_err(ItemFailure::from));

        match result {
            Ok(verified) => {
                info!(
                    title = %item.title,
                    entries = verified.entries,
                    size_bytes = verified.size_bytes,
                    "Backup completed"
                );
                ItemOutcome::BackedUp {
                    archive: verified.path,
                }
            }
            Err(failure) => {
                record_failure(error_log, &item.id, &item.title, &failure);
                ItemOutcome::Failed {
                    failure,
                    archive: Some(attempted),
                }
            }
        }
    }
}

fn record_failure(error_log: &ErrorLog, item_id: &str, title: &str, failure: &ItemFailure) {
    error!(item_id, title, kind = failure.kind(), error = %failure, "Backup failed");
    match error_log.record(item_id, title, failure) {
        Ok(()) => info!(path = %error_log.path().display(), "Error logged"),
        Err(e) => error!(error = %e, "Unable to write error log"),
    }
}
