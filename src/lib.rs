//! hfs-backup - Incremental backups of hosted feature services
//!
//! This library backs up a configured list of sync-enabled hosted feature
//! services to zipped file geodatabases, skipping services that have not
//! been edited since their last successful backup. The only long-lived
//! state is the backup ledger, a CSV with one row per tracked item.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Settings and output path layout
//! - `error`: Custom error types
//! - `models`: Item metadata, ledger records and run log entries
//! - `storage`: CSV persistence for the item list and the ledger
//! - `portal`: Catalog and export capabilities, and the REST client
//! - `services`: Classification, export, verification and commit
//! - `audit`: Run log and error log files
//! - `cli`: Command handlers
//! - `display`: Terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use hfs_backup::config::Settings;
//! use hfs_backup::services::{BackupRun, RunContext};
//!
//! let settings = Settings::load(&config_file)?;
//! let ctx = RunContext::new(settings.backup_paths()?, settings.full_backup);
//! let summary = BackupRun::new(&client, &client).execute(&ctx, &item_ids);
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod portal;
pub mod services;
pub mod storage;

#[cfg(test)]
mod testing;

pub use error::{BackupError, BackupResult};
