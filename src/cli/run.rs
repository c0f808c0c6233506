//! Run command
//!
//! Resolves settings, reads the item list and drives one backup run
//! against the configured portal.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tracing::{info, warn};

use crate::config::{Settings, SettingsOverrides};
use crate::display::format_run_summary;
use crate::error::BackupResult;
use crate::portal::ArcGisClient;
use crate::services::{BackupRun, RunContext, RunSummary};
use crate::storage::read_item_ids;

/// Options for a backup run
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Back up every listed item, ignoring the ledger
    #[arg(long)]
    pub full: bool,

    /// CSV listing the items to back up (overrides csv_location)
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Output root for archives, logs and the ledger (overrides download_location)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

impl From<RunArgs> for SettingsOverrides {
    fn from(args: RunArgs) -> Self {
        Self {
            full_backup: args.full,
            csv_location: args.csv,
            download_location: args.out,
        }
    }
}

/// Handle the run command
///
/// Configuration problems are returned as errors. Per-item failures are
/// reported in the summary and never turn into an error here.
pub fn handle_run_command(mut settings: Settings, args: RunArgs) -> BackupResult<RunSummary> {
    settings.apply_overrides(args.into());

    let csv_location = settings.require_csv_location()?.to_path_buf();
    let paths = settings.backup_paths()?;
    let item_ids = read_item_ids(&csv_location)?;

    let ctx = RunContext::new(paths, settings.full_backup);

    if item_ids.is_empty() {
        info!(path = %csv_location.display(), "Item list is empty, nothing to back up");
        return Ok(RunSummary::empty(&ctx));
    }

    let token = settings.token();
    if token.is_none() {
        warn!(
            env = %settings.token_env,
            "No access token set, only public items can be backed up"
        );
    }

    let client = ArcGisClient::new(
        settings.portal_url.clone(),
        token,
        Duration::from_secs(settings.request_timeout_secs),
    )?;

    info!(
        items = item_ids.len(),
        full_backup = ctx.full_backup,
        root = %ctx.paths.root().display(),
        "Starting backup run {}",
        ctx.stamp
    );

    let summary = BackupRun::new(&client, &client).execute(&ctx, &item_ids);
    println!("{}", format_run_summary(&summary));

    Ok(summary)
}
