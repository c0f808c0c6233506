//! Backup ledger
//!
//! The ledger maps each tracked item id to its `BackupRecord`. Merging is a
//! pure function of the base ledger and the incoming patches; only the
//! `LedgerStore` reads or writes the ledger file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::BackupResult;
use crate::models::{BackupRecord, RecordPatch};

use super::file_io::{read_csv_required, write_csv_atomic};

/// Ledger file columns, in `BackupRecord` field order
pub const LEDGER_HEADERS: [&str; 10] = [
    "item_id",
    "item_name",
    "item_title",
    "url",
    "updated_ts",
    "last_edit_date",
    "last_edit_date_ts",
    "backup_date",
    "backup_ts",
    "zip_path",
];

/// In-memory ledger keyed by item id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    records: BTreeMap<String, BackupRecord>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from records; a later duplicate id replaces an earlier one
    pub fn from_records(records: impl IntoIterator<Item = BackupRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.item_id.clone(), r))
            .collect();
        Self { records }
    }

    /// Get a record by item id
    pub fn get(&self, item_id: &str) -> Option<&BackupRecord> {
        self.records.get(item_id)
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.records.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in item id order
    pub fn records(&self) -> impl Iterator<Item = &BackupRecord> {
        self.records.values()
    }

    /// Merge patches into a copy of this ledger
    ///
    /// Existing records get only the supplied fields overwritten. Unknown
    /// ids become new records with "never backed up" sentinels. Records are
    /// never removed.
    pub fn merged<'a>(&self, incoming: impl IntoIterator<Item = &'a RecordPatch>) -> Ledger {
        let mut records = self.records.clone();

        for patch in incoming {
            match records.get_mut(&patch.item_id) {
                Some(record) => {
                    if !record.apply(patch) {
                        debug!(
                            item_id = %patch.item_id,
                            "Ignoring backup stamp older than the recorded backup"
                        );
                    }
                }
                None => {
                    records.insert(patch.item_id.clone(), BackupRecord::from_patch(patch));
                }
            }
        }

        Ledger { records }
    }
}

/// Merge patches into `base`, producing a new ledger
pub fn merge<'a>(base: &Ledger, incoming: impl IntoIterator<Item = &'a RecordPatch>) -> Ledger {
    base.merged(incoming)
}

/// Result of loading the ledger file
#[derive(Debug, Clone)]
pub struct LoadedLedger {
    pub ledger: Ledger,
    /// False when the file was missing or unreadable
    pub has_prior_state: bool,
}

/// Owns the durable ledger file
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    /// Create a store for the ledger at `path`
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the ledger file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger, failing soft
    ///
    /// A missing or unreadable file yields an empty ledger with
    /// `has_prior_state == false`.
    pub fn load(&self) -> LoadedLedger {
        match self.try_load() {
            Ok(ledger) => LoadedLedger {
                ledger,
                has_prior_state: true,
            },
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Couldn't open the ledger of successful backups, backing up all services"
                );
                LoadedLedger {
                    ledger: Ledger::new(),
                    has_prior_state: false,
                }
            }
        }
    }

    /// Load the ledger, returning any read or parse error
    pub fn try_load(&self) -> BackupResult<Ledger> {
        let records: Vec<BackupRecord> = read_csv_required(&self.path)?;
        Ok(Ledger::from_records(records))
    }

    /// Write the ledger atomically
    pub fn save(&self, ledger: &Ledger) -> BackupResult<()> {
        let rows: Vec<&BackupRecord> = ledger.records().collect();
        write_csv_atomic(&self.path, &LEDGER_HEADERS, &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackupStamp, NOT_BACKED_UP};
    use tempfile::TempDir;

    fn metadata_patch(id: &str, last_edit: i64) -> RecordPatch {
        RecordPatch {
            item_id: id.to_string(),
            item_name: Some(format!("{}_name", id)),
            item_title: Some(format!("{} title", id)),
            url: Some(format!("https://services.example.com/{}/FeatureServer", id)),
            updated_ts: Some(last_edit),
            last_edit_date_ts: Some(last_edit),
            backup: None,
        }
    }

    fn backup_patch(id: &str, ts: i64) -> RecordPatch {
        RecordPatch {
            item_id: id.to_string(),
            backup: Some(BackupStamp {
                backup_ts: ts,
                zip_path: format!("/out/{}_{}.zip", id, ts),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_inserts_new_items_with_sentinels() {
        let ledger = merge(&Ledger::new(), &[metadata_patch("a", 100)]);

        let record = ledger.get("a").unwrap();
        assert_eq!(record.item_title, "a title");
        assert_eq!(record.last_edit_date_ts, 100);
        assert_eq!(record.backup_ts, None);
        assert_eq!(record.backup_date, NOT_BACKED_UP);
        assert_eq!(record.zip_path, NOT_BACKED_UP);
    }

    #[test]
    fn test_merge_preserves_backup_fields() {
        let base = merge(&Ledger::new(), &[metadata_patch("a", 100), backup_patch("a", 150)]);
        let merged = merge(&base, &[metadata_patch("a", 200)]);

        let record = merged.get("a").unwrap();
        assert_eq!(record.last_edit_date_ts, 200);
        assert_eq!(record.backup_ts, Some(150));
        assert_eq!(record.zip_path, "/out/a_150.zip");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let base = merge(&Ledger::new(), &[metadata_patch("a", 100), metadata_patch("b", 50)]);
        let patches = [metadata_patch("a", 300), backup_patch("b", 400), metadata_patch("c", 10)];

        let once = merge(&base, &patches);
        let twice = merge(&once, &patches);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_never_removes_records() {
        let base = merge(&Ledger::new(), &[metadata_patch("a", 1), metadata_patch("b", 2)]);
        let merged = merge(&base, &[metadata_patch("c", 3)]);

        assert_eq!(merged.len(), 3);
        assert!(merged.contains("a"));
        assert!(merged.contains("b"));
    }

    #[test]
    fn test_merge_does_not_touch_base() {
        let base = merge(&Ledger::new(), &[metadata_patch("a", 1)]);
        let snapshot = base.clone();
        let _ = merge(&base, &[backup_patch("a", 99), metadata_patch("z", 5)]);
        assert_eq!(base, snapshot);
    }

    #[test]
    fn test_backup_ts_is_monotonic_across_merges() {
        let mut ledger = merge(&Ledger::new(), &[metadata_patch("a", 10)]);
        let mut last = 0;
        for ts in [100, 300, 200, 300, 250, 500] {
            ledger = merge(&ledger, &[backup_patch("a", ts)]);
            let current = ledger.get("a").unwrap().backup_ts.unwrap();
            assert!(current >= last);
            last = current;
        }
        assert_eq!(last, 500);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path().join("ledger.csv"));

        let ledger = merge(
            &Ledger::new(),
            &[
                metadata_patch("a", 1_704_067_200_000),
                metadata_patch("b", 1_704_153_600_000),
                backup_patch("a", 1_704_100_000_000),
            ],
        );

        store.save(&ledger).unwrap();
        let loaded = store.try_load().unwrap();

        assert_eq!(loaded, ledger);
    }

    #[test]
    fn test_load_missing_file_signals_no_prior_state() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path().join("missing.csv"));

        let loaded = store.load();
        assert!(!loaded.has_prior_state);
        assert!(loaded.ledger.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_signals_no_prior_state() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.csv");
        std::fs::write(&path, "item_id,item_name\n\"unterminated\n").unwrap();

        let store = LedgerStore::new(path);
        let loaded = store.load();
        assert!(!loaded.has_prior_state);
    }

    #[test]
    fn test_load_empty_ledger_with_header() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path().join("ledger.csv"));
        store.save(&Ledger::new()).unwrap();

        let loaded = store.load();
        assert!(loaded.has_prior_state);
        assert!(loaded.ledger.is_empty());
    }

    #[test]
    fn test_load_ledger_written_by_spreadsheet_tools() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.csv");
        std::fs::write(
            &path,
            "item_id,item_name,item_title,url,updated_ts,backup_date,backup_ts,zip_path,last_edit_date,last_edit_date_ts\n\
             a,a_name,A,https://x/FeatureServer,1700000000000.0,Not yet backed up,0,Not yet backed up,01/01/2024 00:00:00,1704067200000\n\
             b,b_name,B,https://y/FeatureServer,1700000000000,02/01/2024 00:00:00,,/out/b.zip,01/01/2024 00:00:00,1704067200000\n",
        )
        .unwrap();

        let ledger = LedgerStore::new(path).try_load().unwrap();
        let a = ledger.get("a").unwrap();
        assert_eq!(a.updated_ts, 1_700_000_000_000);
        assert_eq!(a.backup_ts, None);
        assert!(a.is_stale());
        assert_eq!(ledger.get("b").unwrap().backup_ts, None);
    }
}
