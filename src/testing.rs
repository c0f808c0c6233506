//! In-memory catalog and exporter used by the service tests

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use zip::write::SimpleFileOptions;

use crate::error::{BackupError, BackupResult, ExportError};
use crate::models::{ItemMetadata, SubLayer};
use crate::portal::{Catalog, ExportRequest, Exporter};

/// Build an item with one layer edited at `last_edit_ts`
pub fn item(id: &str, title: &str, last_edit_ts: i64) -> ItemMetadata {
    ItemMetadata {
        id: id.to_string(),
        name: format!("{}_name", id),
        title: title.to_string(),
        url: format!("https://services.example.com/{}/FeatureServer", title),
        modified_ts: last_edit_ts,
        layers: vec![SubLayer::new(0, "features", Some(last_edit_ts))],
        tables: vec![SubLayer::new(1, "related", Some(last_edit_ts - 1))],
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    items: HashMap<String, ItemMetadata>,
}

impl FakeCatalog {
    pub fn with_items(items: impl IntoIterator<Item = ItemMetadata>) -> Self {
        Self {
            items: items.into_iter().map(|i| (i.id.clone(), i)).collect(),
        }
    }
}

impl Catalog for FakeCatalog {
    fn item(&self, item_id: &str) -> BackupResult<ItemMetadata> {
        self.items
            .get(item_id)
            .cloned()
            .ok_or_else(|| BackupError::item_not_found(item_id))
    }
}

/// What the fake exporter does for a given item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Write a valid zip package
    Zip,
    /// Report an export failure after leaving a partial file behind
    Fail,
    /// Write a file that is not a zip package
    Garbage,
    /// Write a zero-length file
    Empty,
}

#[derive(Default)]
pub struct FakeExporter {
    behaviors: HashMap<String, Behavior>,
    calls: RefCell<Vec<(String, Vec<u32>)>>,
}

impl FakeExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, item_id: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(item_id.to_string(), behavior);
        self
    }

    /// Item ids and layer lists exported so far, in call order
    pub fn calls(&self) -> Vec<(String, Vec<u32>)> {
        self.calls.borrow().clone()
    }

    pub fn exported_ids(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(id, _)| id.clone()).collect()
    }
}

/// Write a small valid zip package at `path`
pub fn write_zip(path: &std::path::Path) {
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("backup.gdb/a00000001.gdbtable", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"gdb table bytes").unwrap();
    writer.finish().unwrap();
}

impl Exporter for FakeExporter {
    fn export(&self, request: &ExportRequest<'_>) -> Result<PathBuf, ExportError> {
        self.calls
            .borrow_mut()
            .push((request.item.id.clone(), request.layers.to_vec()));

        let behavior = self
            .behaviors
            .get(&request.item.id)
            .copied()
            .unwrap_or(Behavior::Zip);
        let target = request.out_dir.join(format!("{}.zip", request.replica_name));

        match behavior {
            Behavior::Zip => write_zip(&target),
            Behavior::Fail => {
                std::fs::write(request.out_dir.join("partial.download"), b"partial").unwrap();
                return Err(ExportError::Rejected("Unable to create replica".into()));
            }
            Behavior::Garbage => std::fs::write(&target, b"this is not a zip").unwrap(),
            Behavior::Empty => std::fs::write(&target, b"").unwrap(),
        }

        Ok(target)
    }
}
