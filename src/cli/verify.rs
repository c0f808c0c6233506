//! Verify command

use std::path::Path;

use crate::error::BackupResult;
use crate::services::verify_archive;

/// Handle the verify command
///
/// An archive that fails verification is returned as an error so the
/// process exits non-zero.
pub fn handle_verify_command(path: &Path) -> BackupResult<()> {
    let verified = verify_archive(path)?;

    println!("OK: {}", verified.path.display());
    println!("  Entries: {}", verified.entries);
    println!("  Size:    {}", format_size(verified.size_bytes));

    Ok(())
}

/// Format a byte count for display
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
