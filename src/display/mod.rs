//! Display formatting for terminal output
//!
//! Provides the ledger status table and the end-of-run summary.

pub mod ledger;
pub mod run;

pub use ledger::format_ledger_status;
pub use run::format_run_summary;
