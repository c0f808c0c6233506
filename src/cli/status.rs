//! Status command
//!
//! Prints the ledger without contacting the portal.

use crate::config::Settings;
use crate::display::format_ledger_status;
use crate::error::BackupResult;
use crate::storage::LedgerStore;

/// Handle the status command
///
/// A missing ledger is reported, not treated as an error.
pub fn handle_status_command(settings: &Settings) -> BackupResult<()> {
    let paths = settings.backup_paths()?;
    let store = LedgerStore::new(paths.ledger_file());

    if !store.path().exists() {
        println!("No ledger found at {}", store.path().display());
        println!("Run 'hfs-backup run' to create one.");
        return Ok(());
    }

    let ledger = store.try_load()?;

    println!("Ledger: {}", store.path().display());
    println!();
    println!("{}", format_ledger_status(&ledger));

    Ok(())
}
