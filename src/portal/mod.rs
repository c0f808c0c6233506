//! Hosted service collaborators
//!
//! The backup engine talks to the portal through two traits:
//!
//! - `Catalog`: look up an item and the edit state of its layers and tables
//! - `Exporter`: build a replica of a service and download it
//!
//! `ArcGisClient` implements both against the ArcGIS REST API.

pub mod client;
mod types;

use std::path::{Path, PathBuf};

use crate::error::{BackupResult, ExportError};
use crate::models::ItemMetadata;

pub use client::ArcGisClient;

/// Read-only access to item metadata
pub trait Catalog {
    /// Look up one item by its catalog identifier
    fn item(&self, item_id: &str) -> BackupResult<ItemMetadata>;
}

/// Output format of a replica
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    FileGeodatabase,
}

impl DataFormat {
    /// Value of the `dataFormat` request parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            DataFormat::FileGeodatabase => "filegdb",
        }
    }
}

/// A one-off replica export of one item
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    /// The item being exported
    pub item: &'a ItemMetadata,
    /// Layer and table indexes to include
    pub layers: &'a [u32],
    /// Name given to the replica on the server
    pub replica_name: String,
    /// Directory the artifact is downloaded into
    pub out_dir: &'a Path,
    pub data_format: DataFormat,
    /// Include attachments (always false for backups)
    pub return_attachments: bool,
    /// Keep a sync relationship with the server (always false for backups)
    pub sync: bool,
    /// Ask the server to build the replica asynchronously
    pub asynchronous: bool,
}

impl<'a> ExportRequest<'a> {
    /// A blocking file geodatabase export without attachments or sync
    pub fn file_geodatabase(
        item: &'a ItemMetadata,
        layers: &'a [u32],
        replica_name: impl Into<String>,
        out_dir: &'a Path,
    ) -> Self {
        Self {
            item,
            layers,
            replica_name: replica_name.into(),
            out_dir,
            data_format: DataFormat::FileGeodatabase,
            return_attachments: false,
            sync: false,
            asynchronous: false,
        }
    }
}

/// Builds and downloads replicas
pub trait Exporter {
    /// Export the requested layers into `request.out_dir`
    ///
    /// Returns the path of the downloaded artifact.
    fn export(&self, request: &ExportRequest<'_>) -> Result<PathBuf, ExportError>;
}
