//! Ledger display formatting
//!
//! Formats the backup ledger as a status table for the terminal.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{BackupRecord, NOT_BACKED_UP};
use crate::storage::Ledger;

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Item ID")]
    item_id: String,
    #[tabled(rename = "Last Edit")]
    last_edit: String,
    #[tabled(rename = "Last Backup")]
    last_backup: String,
    #[tabled(rename = "Stale")]
    stale: &'static str,
    #[tabled(rename = "Archive")]
    archive: String,
}

impl From<&BackupRecord> for StatusRow {
    fn from(record: &BackupRecord) -> Self {
        Self {
            title: record.item_title.clone(),
            item_id: record.item_id.clone(),
            last_edit: record.last_edit_date.clone(),
            last_backup: if record.has_backup() {
                record.backup_date.clone()
            } else {
                NOT_BACKED_UP.to_string()
            },
            stale: if record.is_stale() { "yes" } else { "no" },
            archive: record.zip_path.clone(),
        }
    }
}

/// Format the ledger as a table, one row per tracked item
pub fn format_ledger_status(ledger: &Ledger) -> String {
    if ledger.is_empty() {
        return "No items tracked yet.".to_string();
    }

    let rows: Vec<StatusRow> = ledger.records().map(StatusRow::from).collect();
    let stale = ledger.records().filter(|r| r.is_stale()).count();

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push_str(&format!(
        "\n\n{} item(s) tracked, {} stale",
        ledger.len(),
        stale
    ));
    output
}
