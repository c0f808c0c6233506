//! Run records for hfs-backup
//!
//! Together with the ledger, these files give an auditable history of what
//! each run attempted:
//!
//! - `RunLogWriter`: one CSV per run with the status of every configured item
//! - `ErrorLog`: one plain-text log per run with the cause of each failure

pub mod error_log;
pub mod run_log;

pub use error_log::ErrorLog;
pub use run_log::{RunLogWriter, RUN_LOG_HEADERS};
