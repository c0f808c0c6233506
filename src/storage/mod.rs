//! Storage layer for hfs-backup
//!
//! Provides the CSV-backed ledger store, the input item list reader, and
//! atomic CSV writes shared with the run log.

pub mod file_io;
pub mod item_list;
pub mod ledger;

pub use file_io::{read_csv_required, write_csv_atomic};
pub use item_list::read_item_ids;
pub use ledger::{merge, Ledger, LedgerStore, LoadedLedger, LEDGER_HEADERS};
