//! Custom error types for hfs-backup
//!
//! Run-level failures use `BackupError`. Failures that belong to a single
//! item never surface as `BackupError`; they are carried as `ItemFailure`
//! in the item's outcome so one bad service cannot stop a run.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for hfs-backup operations
#[derive(Error, Debug)]
pub enum BackupError {
    /// Configuration-related errors (fatal for a run)
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// CSV read/write errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Ledger and run log persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Catalog lookups rejected by the portal
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// An archive failed verification
    #[error("Archive verification failed: {0}")]
    Verify(#[from] VerifyError),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

impl BackupError {
    /// Create a "not found" error for catalog items
    pub fn item_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Item",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<csv::Error> for BackupError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<reqwest::Error> for BackupError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Result type alias for hfs-backup operations
pub type BackupResult<T> = Result<T, BackupError>;

/// Failure reported by the replica export capability
#[derive(Error, Debug)]
pub enum ExportError {
    /// The service answered but refused to build the replica
    #[error("replica request rejected: {0}")]
    Rejected(String),

    /// The service does not advertise the Sync capability
    #[error("sync is not enabled on {0}")]
    SyncDisabled(String),

    /// The request never got a usable answer
    #[error("transport failure: {0}")]
    Transport(String),

    /// The replica was built but could not be downloaded
    #[error("download failed: {0}")]
    Download(String),
}

impl From<reqwest::Error> for ExportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Reasons an archive fails verification
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("archive does not exist: {}", .0.display())]
    Missing(PathBuf),

    #[error("archive is empty: {}", .0.display())]
    Empty(PathBuf),

    #[error("archive is not a readable zip package: {0}")]
    Corrupt(String),

    #[error("archive contains no entries: {}", .0.display())]
    NoEntries(PathBuf),
}

/// Why a single item did not end up with a committed backup
#[derive(Error, Debug)]
pub enum ItemFailure {
    /// The catalog lookup for the configured identifier failed
    #[error("catalog lookup failed: {0}")]
    Lookup(#[source] BackupError),

    /// The service has no layers or tables to put in a replica
    #[error("service has no layers or tables to export")]
    NoLayers,

    /// The per-run working directory could not be prepared or cleaned
    #[error("working directory {}: {message}", .path.display())]
    Workspace { path: PathBuf, message: String },

    /// The export capability failed
    #[error("export failed")]
    Export(#[from] ExportError),

    /// The export succeeded but its artifact could not be committed
    #[error("archive could not be moved into place: {0}")]
    Artifact(String),

    /// The committed archive is not a valid package
    #[error("verification failed")]
    Verify(#[from] VerifyError),
}

impl ItemFailure {
    /// Short label used in console output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Lookup(_) => "lookup",
            Self::NoLayers => "no-layers",
            Self::Workspace { .. } => "workspace",
            Self::Export(_) => "export",
            Self::Artifact(_) => "artifact",
            Self::Verify(_) => "verify",
        }
    }
}
