//! CSV file I/O with atomic writes
//!
//! Provides safe file operations that won't corrupt the ledger on failure.

use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::BackupError;

/// Read every row of a headed CSV file, returning an error if the file doesn't exist
pub fn read_csv_required<T, P>(path: P) -> Result<Vec<T>, BackupError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Err(BackupError::Storage(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let file = File::open(path)
        .map_err(|e| BackupError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let mut rows = Vec::new();
    for (index, row) in reader.deserialize().enumerate() {
        let row: T = row.map_err(|e| {
            BackupError::Csv(format!(
                "Failed to parse {} row {}: {}",
                path.display(),
                index + 2,
                e
            ))
        })?;
        rows.push(row);
    }

    Ok(rows)
}

/// Write rows to a headed CSV file atomically (write to temp, then rename)
///
/// The header row is written even when `rows` is empty.
pub fn write_csv_atomic<T, P>(path: P, headers: &[&str], rows: &[T]) -> Result<(), BackupError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            BackupError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("csv.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| BackupError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer
        .write_record(headers)
        .map_err(|e| BackupError::Storage(format!("Failed to write header: {}", e)))?;

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| BackupError::Storage(format!("Failed to serialize row: {}", e)))?;
    }

    let mut file = writer
        .into_inner()
        .map_err(|e| BackupError::Storage(format!("Failed to flush data: {}", e)))?;

    file.flush()
        .map_err(|e| BackupError::Storage(format!("Failed to flush data: {}", e)))?;

    file.sync_all()
        .map_err(|e| BackupError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        BackupError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        name: String,
        value: i32,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                name: "alpha, with comma".to_string(),
                value: 1,
            },
            Row {
                name: "beta".to_string(),
                value: 2,
            },
        ]
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rows.csv");

        write_csv_atomic(&path, &["name", "value"], &rows()).unwrap();

        let loaded: Vec<Row> = read_csv_required(&path).unwrap();
        assert_eq!(loaded, rows());
    }

    #[test]
    fn test_empty_rows_still_write_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rows.csv");

        write_csv_atomic::<Row, _>(&path, &["name", "value"], &[]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "name,value");
        let loaded: Vec<Row> = read_csv_required(&path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_atomic_write_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rows.csv");

        write_csv_atomic(&path, &["name", "value"], &rows()).unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("rows.csv.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("rows.csv");

        write_csv_atomic(&path, &["name", "value"], &rows()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_read_required_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_csv_required::<Row, _>(temp_dir.path().join("missing.csv"));
        assert!(matches!(result, Err(BackupError::Storage(_))));
    }

    #[test]
    fn test_read_reports_bad_row() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rows.csv");
        fs::write(&path, "name,value\nok,1\nbad,notanumber\n").unwrap();

        let err = read_csv_required::<Row, _>(&path).unwrap_err();
        assert!(err.to_string().contains("row 3"));
    }
}
