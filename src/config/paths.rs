//! Path management for hfs-backup
//!
//! Every file and directory a run touches is derived from the configured
//! download location (the output root):
//!
//! ```text
//! <root>/<ledger file>
//! <root>/backups/<title>/<title>_<stamp>_<id>.zip   committed archives
//! <root>/backups/<title>/<stamp>_<id>/               per-run working directory
//! <root>/logs/<stamp>_backup_run_log.csv
//! <root>/logs/error_<stamp>.log
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::BackupError;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "HFS_BACKUP_CONFIG";

/// Manages all paths used by a backup run
#[derive(Debug, Clone)]
pub struct BackupPaths {
    /// Output root (the configured download location)
    root: PathBuf,
    /// Name of the ledger file inside the root
    ledger_filename: String,
}

impl BackupPaths {
    /// Create paths rooted at the download location
    pub fn new(root: impl Into<PathBuf>, ledger_filename: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ledger_filename: ledger_filename.into(),
        }
    }

    /// Get the output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the durable ledger file
    pub fn ledger_file(&self) -> PathBuf {
        self.root.join(&self.ledger_filename)
    }

    /// Get the directory holding every item's backups
    pub fn backups_dir(&self) -> PathBuf {
        self.root.join("backups")
    }

    /// Get the log directory (run logs and error logs)
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Get an item's top-level backup directory
    pub fn item_dir(&self, title: &str) -> PathBuf {
        self.backups_dir().join(sanitize_file_name(title))
    }

    /// Get the transient working directory for one item in one run
    ///
    /// Titles are not unique, so the item id keeps two items that share a
    /// title from sharing a directory.
    pub fn work_dir(&self, title: &str, item_id: &str, stamp: &str) -> PathBuf {
        self.item_dir(title)
            .join(format!("{}_{}", stamp, sanitize_file_name(item_id)))
    }

    /// Canonical archive name: `<title>_<stamp>_<item id>.zip`
    pub fn archive_name(title: &str, item_id: &str, stamp: &str) -> String {
        format!(
            "{}_{}_{}.zip",
            sanitize_file_name(title),
            stamp,
            sanitize_file_name(item_id)
        )
    }

    /// Final location of an item's archive once committed
    pub fn archive_path(&self, title: &str, item_id: &str, stamp: &str) -> PathBuf {
        self.item_dir(title)
            .join(Self::archive_name(title, item_id, stamp))
    }

    /// Run log for the run identified by `stamp`
    pub fn run_log_file(&self, stamp: &str) -> PathBuf {
        self.logs_dir().join(format!("{}_backup_run_log.csv", stamp))
    }

    /// Error log for the run identified by `stamp`
    pub fn error_log_file(&self, stamp: &str) -> PathBuf {
        self.logs_dir().join(format!("error_{}.log", stamp))
    }

    /// Ensure the backup and log directories exist
    pub fn ensure_directories(&self) -> Result<(), BackupError> {
        std::fs::create_dir_all(self.backups_dir())
            .map_err(|e| BackupError::Io(format!("Failed to create backups directory: {}", e)))?;

        std::fs::create_dir_all(self.logs_dir())
            .map_err(|e| BackupError::Io(format!("Failed to create log directory: {}", e)))?;

        Ok(())
    }
}

/// Resolve the settings file location
///
/// Resolution order:
/// 1. explicit path (the `--config` flag)
/// 2. `HFS_BACKUP_CONFIG` env var
/// 3. the platform config directory (`~/.config/hfs-backup/config.json` on Linux)
pub fn resolve_config_file(explicit: Option<&Path>) -> Result<PathBuf, BackupError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(custom) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(custom));
    }

    ProjectDirs::from("", "", "hfs-backup")
        .map(|dirs| dirs.config_dir().join("config.json"))
        .ok_or_else(|| BackupError::Config("Could not determine a config directory".into()))
}

/// Replace characters that cannot appear in a file name
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "_".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BackupPaths::new(temp_dir.path(), "ledger.csv");

        assert_eq!(paths.ledger_file(), temp_dir.path().join("ledger.csv"));
        assert_eq!(
            paths.work_dir("Parcels", "abc123", "20240101_120000"),
            temp_dir
                .path()
                .join("backups")
                .join("Parcels")
                .join("20240101_120000_abc123")
        );
        assert_eq!(
            paths.archive_path("Parcels", "abc123", "20240101_120000"),
            temp_dir
                .path()
                .join("backups")
                .join("Parcels")
                .join("Parcels_20240101_120000_abc123.zip")
        );
        assert_eq!(
            paths.run_log_file("20240101_120000"),
            temp_dir
                .path()
                .join("logs")
                .join("20240101_120000_backup_run_log.csv")
        );
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BackupPaths::new(temp_dir.path(), "ledger.csv");

        paths.ensure_directories().unwrap();
        // Idempotent
        paths.ensure_directories().unwrap();

        assert!(paths.backups_dir().is_dir());
        assert!(paths.logs_dir().is_dir());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("Roads / Trails"), "Roads _ Trails");
        assert_eq!(sanitize_file_name("a:b*c?"), "a_b_c_");
        assert_eq!(sanitize_file_name("  Wetlands "), "Wetlands");
        assert_eq!(sanitize_file_name(".."), "_");
        assert_eq!(sanitize_file_name(""), "_");
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let explicit = PathBuf::from("/tmp/custom.json");
        assert_eq!(resolve_config_file(Some(&explicit)).unwrap(), explicit);
    }

    #[test]
    fn test_items_sharing_a_sanitized_title_get_separate_paths() {
        let paths = BackupPaths::new("/out", "ledger.csv");
        let stamp = "20240101_120000";

        assert_eq!(paths.item_dir("A/B"), paths.item_dir("A_B"));
        assert_ne!(paths.work_dir("A/B", "one", stamp), paths.work_dir("A_B", "two", stamp));
        assert_ne!(
            paths.archive_path("A/B", "one", stamp),
            paths.archive_path("A_B", "two", stamp)
        );
    }
}
