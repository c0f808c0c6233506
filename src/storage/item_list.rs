//! Input item list
//!
//! The operator lists the items to back up in a CSV file with an `item_id`
//! column. Other columns (item names, notes) are ignored.

use std::collections::HashSet;
use std::path::Path;

use tracing::warn;

use crate::error::{BackupError, BackupResult};

const ITEM_ID_COLUMN: &str = "item_id";

/// Read the configured item ids, in file order, without duplicates
///
/// A missing or unreadable file, or one without an `item_id` column, is a
/// configuration error. An empty list is returned as-is; the caller decides
/// what an empty run means.
pub fn read_item_ids(path: &Path) -> BackupResult<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| {
            BackupError::Config(format!("Failed to open item list {}: {}", path.display(), e))
        })?;

    let headers = reader.headers().map_err(|e| {
        BackupError::Config(format!("Failed to read item list header: {}", e))
    })?;

    let column = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == ITEM_ID_COLUMN)
        .ok_or_else(|| {
            BackupError::Config(format!(
                "Item list {} has no '{}' column",
                path.display(),
                ITEM_ID_COLUMN
            ))
        })?;

    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            BackupError::Config(format!("Failed to read item list row {}: {}", index + 2, e))
        })?;

        let Some(id) = record.get(column).filter(|id| !id.is_empty()) else {
            continue;
        };

        if seen.insert(id.to_string()) {
            ids.push(id.to_string());
        } else {
            warn!(item_id = %id, "Item listed more than once, backing it up once");
        }
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_list(contents: &str) -> (TempDir, std::path::PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("items.csv");
        std::fs::write(&path, contents).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_reads_item_ids_and_ignores_other_columns() {
        let (_temp, path) = write_list("item_name,item_id\nParcels, abc \nRoads,def\n");
        assert_eq!(read_item_ids(&path).unwrap(), vec!["abc", "def"]);
    }

    #[test]
    fn test_skips_blanks_and_duplicates() {
        let (_temp, path) = write_list("item_id\nabc\n\nabc\n,\ndef\n");
        assert_eq!(read_item_ids(&path).unwrap(), vec!["abc", "def"]);
    }

    #[test]
    fn test_header_only_is_empty() {
        let (_temp, path) = write_list("item_id\n");
        assert!(read_item_ids(&path).unwrap().is_empty());
    }

    #[test]
    fn test_handles_byte_order_mark() {
        let (_temp, path) = write_list("\u{feff}item_id\nabc\n");
        assert_eq!(read_item_ids(&path).unwrap(), vec!["abc"]);
    }

    #[test]
    fn test_missing_column_is_config_error() {
        let (_temp, path) = write_list("id\nabc\n");
        assert!(read_item_ids(&path).unwrap_err().is_config());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_item_ids(&temp_dir.path().join("nope.csv")).unwrap_err();
        assert!(err.is_config());
    }
}
