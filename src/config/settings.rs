//! Settings for hfs-backup
//!
//! Settings live in a JSON file. Command-line flags are layered on top with
//! [`Settings::apply_overrides`] before the run is started.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::paths::BackupPaths;
use crate::error::BackupError;

/// User settings for hfs-backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Portal hosting the items (ArcGIS Online or an Enterprise portal)
    #[serde(default = "default_portal_url")]
    pub portal_url: String,

    /// Back up every listed item, ignoring the ledger
    #[serde(default)]
    pub full_backup: bool,

    /// CSV listing the items to back up (`item_id` column)
    #[serde(default)]
    pub csv_location: Option<PathBuf>,

    /// Output root for archives, logs and the ledger
    #[serde(default)]
    pub download_location: Option<PathBuf>,

    /// Ledger file name within the output root
    #[serde(default = "default_ledger_filename")]
    pub ledger_filename: String,

    /// Environment variable holding a pre-issued access token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Timeout for a single catalog or replica request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_schema_version() -> u32 {
    1
}

fn default_portal_url() -> String {
    "https://www.arcgis.com".to_string()
}

fn default_ledger_filename() -> String {
    "Last_Successful_Backup.csv".to_string()
}

fn default_token_env() -> String {
    "HFS_BACKUP_TOKEN".to_string()
}

fn default_request_timeout_secs() -> u64 {
    600
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            portal_url: default_portal_url(),
            full_backup: false,
            csv_location: None,
            download_location: None,
            ledger_filename: default_ledger_filename(),
            token_env: default_token_env(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub full_backup: bool,
    pub csv_location: Option<PathBuf>,
    pub download_location: Option<PathBuf>,
}

impl Settings {
    /// Load settings from disk, falling back to defaults if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self, BackupError> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| BackupError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| BackupError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> Result<(), BackupError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                BackupError::Io(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| BackupError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| BackupError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Layer command-line values over the file settings
    pub fn apply_overrides(&mut self, overrides: SettingsOverrides) {
        if overrides.full_backup {
            self.full_backup = true;
        }
        if let Some(csv) = overrides.csv_location {
            self.csv_location = Some(csv);
        }
        if let Some(out) = overrides.download_location {
            self.download_location = Some(out);
        }
    }

    /// The input item list, or a configuration error if unset
    pub fn require_csv_location(&self) -> Result<&Path, BackupError> {
        self.csv_location
            .as_deref()
            .ok_or_else(|| BackupError::Config("csv_location is not set".into()))
    }

    /// Paths for the configured output root, or a configuration error if unset
    pub fn backup_paths(&self) -> Result<BackupPaths, BackupError> {
        let root = self
            .download_location
            .as_deref()
            .ok_or_else(|| BackupError::Config("download_location is not set".into()))?;

        if self.ledger_filename.trim().is_empty() {
            return Err(BackupError::Config("ledger_filename cannot be empty".into()));
        }

        Ok(BackupPaths::new(root, self.ledger_filename.clone()))
    }

    /// Read the access token from the configured environment variable
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}
