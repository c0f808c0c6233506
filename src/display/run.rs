//! Run summary formatting

use crate::models::RunStatus;
use crate::services::RunSummary;

/// Format the end-of-run summary printed to the console
pub fn format_run_summary(summary: &RunSummary) -> String {
    if summary.is_empty() {
        return "No items configured, nothing to back up.".to_string();
    }

    let mut output = String::new();

    output.push_str("Backup Run Summary\n");
    output.push_str("==================\n");
    if summary.full_backup {
        output.push_str("Mode:          full backup\n");
    } else {
        output.push_str("Mode:          incremental\n");
    }
    output.push_str(&format!("Backed up:     {}\n", summary.succeeded()));
    output.push_str(&format!("Failed:        {}\n", summary.failed()));
    output.push_str(&format!("Skipped fresh: {}\n", summary.skipped()));

    let failures: Vec<_> = summary
        .entries
        .iter()
        .filter(|e| e.status == RunStatus::Fail)
        .collect();
    if !failures.is_empty() {
        output.push('\n');
        output.push_str("Failed items:\n");
        for entry in failures {
            if entry.item_title.is_empty() {
                output.push_str(&format!("  - {}\n", entry.item_id));
            } else {
                output.push_str(&format!("  - {} ({})\n", entry.item_title, entry.item_id));
            }
        }
    }

    output.push('\n');
    if summary.run_log_saved {
        output.push_str(&format!("Run log:   {}\n", summary.run_log_path.display()));
    } else {
        output.push_str(&format!(
            "Run log:   NOT WRITTEN ({})\n",
            summary.run_log_path.display()
        ));
    }
    if let Some(path) = &summary.error_log_path {
        output.push_str(&format!("Error log: {}\n", path.display()));
    }
    if !summary.ledger_saved {
        output.push_str("Warning: the ledger could not be saved; the next run may repeat backups.\n");
    }

    output
}
