//! Catalog item metadata
//!
//! What the catalog reports about one hosted feature service: identity,
//! display fields, and the sub-layers and tables that make up the service.

use serde::{Deserialize, Serialize};

use super::record::RecordPatch;

/// A layer or table within a feature service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubLayer {
    /// Index of the layer within the service (`FeatureServer/<id>`)
    pub id: u32,

    /// Layer name
    #[serde(default)]
    pub name: String,

    /// Last edit time in epoch milliseconds, if the service tracks edits
    #[serde(default)]
    pub last_edit_ts: Option<i64>,
}

impl SubLayer {
    pub fn new(id: u32, name: impl Into<String>, last_edit_ts: Option<i64>) -> Self {
        Self {
            id,
            name: name.into(),
            last_edit_ts,
        }
    }
}

/// Metadata for one hosted feature service item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Catalog item identifier
    pub id: String,
    /// Item name (often the service name)
    pub name: String,
    /// Item title, used for directory and archive names
    pub title: String,
    /// Feature service endpoint
    pub url: String,
    /// Item-level last modified time (epoch milliseconds)
    pub modified_ts: i64,
    /// Feature layers
    pub layers: Vec<SubLayer>,
    /// Non-spatial tables
    pub tables: Vec<SubLayer>,
}

impl ItemMetadata {
    /// Latest edit across every layer and table
    ///
    /// Zero when the service has no layers or tables, or none report an
    /// edit date, meaning "never edited".
    pub fn last_edit_date_ts(&self) -> i64 {
        self.layers
            .iter()
            .chain(self.tables.iter())
            .filter_map(|l| l.last_edit_ts)
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// Layer and table indexes to include in a replica, layers first
    pub fn export_layer_ids(&self) -> Vec<u32> {
        self.layers
            .iter()
            .chain(self.tables.iter())
            .map(|l| l.id)
            .collect()
    }

    /// Whether the service has anything to export
    pub fn has_layers(&self) -> bool {
        !self.layers.is_empty() || !self.tables.is_empty()
    }

    /// Ledger update carrying this item's metadata and edit timestamps
    pub fn to_patch(&self) -> RecordPatch {
        RecordPatch {
            item_id: self.id.clone(),
            item_name: Some(self.name.clone()),
            item_title: Some(self.title.clone()),
            url: Some(self.url.clone()),
            updated_ts: Some(self.modified_ts),
            last_edit_date_ts: Some(self.last_edit_date_ts()),
            backup: None,
        }
    }
}
