//! Backup engine for hfs-backup
//!
//! - `classifier`: decides which items are stale
//! - `orchestrator`: exports one item into place
//! - `verifier`: checks a produced archive
//! - `committer`: writes the run log and folds successes into the ledger
//! - `run`: ties the above together for one run

pub mod classifier;
pub mod committer;
pub mod context;
pub mod orchestrator;
pub mod run;
pub mod verifier;

pub use classifier::{classify, needs_backup, Classification};
pub use committer::{build_run_log, success_patches, CommitReport, Committer, ItemOutcome, ItemResult};
pub use context::RunContext;
pub use orchestrator::ExportOrchestrator;
pub use run::{BackupRun, RunSummary};
pub use verifier::{verify_archive, VerifiedArchive};
