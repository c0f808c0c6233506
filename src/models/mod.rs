//! Core data models for hfs-backup
//!
//! Catalog metadata for the items being backed up, the durable per-item
//! ledger record, and the per-run log entry.

pub mod item;
pub mod record;
pub mod run_log;

pub use item::{ItemMetadata, SubLayer};
pub use record::{stamp_to_text, BackupRecord, BackupStamp, RecordPatch, NOT_BACKED_UP};
pub use run_log::{RunLogEntry, RunStatus};
