//! Staleness classification
//!
//! Merges fresh catalog metadata into the ledger and decides which items
//! need a backup this run.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::models::{BackupRecord, ItemMetadata, RecordPatch};
use crate::storage::{Ledger, LoadedLedger};

/// Outcome of classifying one run's items
#[derive(Debug, Clone)]
pub struct Classification {
    /// Ledger with the fresh metadata merged in
    pub ledger: Ledger,
    /// Ids of the items to back up this run
    pub stale: BTreeSet<String>,
    /// Whether every item was treated as stale
    pub full_backup: bool,
}

impl Classification {
    pub fn is_stale(&self, item_id: &str) -> bool {
        self.stale.contains(item_id)
    }
}

/// Whether a record needs a backup, honouring full-backup mode
pub fn needs_backup(record: Option<&BackupRecord>, full_backup: bool) -> bool {
    full_backup || record.map_or(true, BackupRecord::is_stale)
}

/// Merge metadata into the loaded ledger and compute the stale set
///
/// Full-backup mode is forced when the ledger could not be loaded. Only the
/// given items are classified; ledger entries for items no longer listed
/// are kept but never stale.
pub fn classify(items: &[ItemMetadata], loaded: &LoadedLedger, full_backup: bool) -> Classification {
    let full_backup = full_backup || !loaded.has_prior_state;

    let patches: Vec<RecordPatch> = items.iter().map(ItemMetadata::to_patch).collect();
    let ledger = loaded.ledger.merged(&patches);

    let stale: BTreeSet<String> = items
        .iter()
        .filter(|item| {
            let stale = needs_backup(ledger.get(&item.id), full_backup);
            debug!(item_id = %item.id, title = %item.title, stale, "Classified item");
            stale
        })
        .map(|item| item.id.clone())
        .collect();

    info!(
        items = items.len(),
        stale = stale.len(),
        full_backup,
        "Classified items"
    );

    Classification {
        ledger,
        stale,
        full_backup,
    }
}
