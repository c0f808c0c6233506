//! Export orchestration
//!
//! Drives one export attempt per item: prepare the per-run working
//! directory, call the exporter, then move the artifact to its canonical
//! name one level up. Any failure is returned as an `ItemFailure` after the
//! working directory has been cleaned up; nothing here aborts the run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::BackupPaths;
use crate::error::ItemFailure;
use crate::models::ItemMetadata;
use crate::portal::{ExportRequest, Exporter};

use super::context::RunContext;

/// Runs exports against an `Exporter`
pub struct ExportOrchestrator<'a, E: Exporter> {
    exporter: &'a E,
}

impl<'a, E: Exporter> ExportOrchestrator<'a, E> {
    /// Create a new orchestrator
    pub fn new(exporter: &'a E) -> Self {
        Self { exporter }
    }

    /// Export one item and move its archive into the item's backup directory
    ///
    /// Returns the committed archive path. The archive is not verified here.
    pub fn export_item(&self, ctx: &RunContext, item: &ItemMetadata) -> Result<PathBuf, ItemFailure> {
        let layers = item.export_layer_ids();
        if layers.is_empty() {
            return Err(ItemFailure::NoLayers);
        }

        let work_dir = ctx.work_dir(item);
        ensure_dir(&work_dir)?;

        info!(title = %item.title, layers = ?layers, "Exporting to file geodatabase");
        let request = ExportRequest::file_geodatabase(
            item,
            &layers,
            ctx.replica_name(&item.title),
            &work_dir,
        );

        let produced = match self.exporter.export(&request) {
            Ok(path) => path,
            Err(e) => {
                remove_work_dir(&work_dir);
                return Err(ItemFailure::Export(e));
            }
        };

        match self.commit_artifact(ctx, item, &work_dir, &produced) {
            Ok(archive) => {
                if let Err(e) = fs::remove_dir(&work_dir) {
                    warn!(path = %work_dir.display(), error = %e, "Couldn't remove working directory");
                }
                info!(title = %item.title, archive = %archive.display(), "Export completed");
                Ok(archive)
            }
            Err(failure) => {
                remove_work_dir(&work_dir);
                Err(failure)
            }
        }
    }

    /// Rename the artifact in place, then move it up out of the working directory
    fn commit_artifact(
        &self,
        ctx: &RunContext,
        item: &ItemMetadata,
        work_dir: &Path,
        produced: &Path,
    ) -> Result<PathBuf, ItemFailure> {
        let artifact = locate_artifact(work_dir, produced)?;

        let canonical_name = BackupPaths::archive_name(&item.title, &item.id, &ctx.stamp);
        let renamed = work_dir.join(&canonical_name);
        if artifact != renamed {
            fs::rename(&artifact, &renamed).map_err(|e| {
                ItemFailure::Artifact(format!(
                    "rename {} -> {}: {}",
                    artifact.display(),
                    renamed.display(),
                    e
                ))
            })?;
        }

        let destination = ctx.archive_path(item);
        fs::rename(&renamed, &destination).map_err(|e| {
            ItemFailure::Artifact(format!(
                "move {} -> {}: {}",
                renamed.display(),
                destination.display(),
                e
            ))
        })?;

        debug!(from = %renamed.display(), to = %destination.display(), "Moved archive");
        Ok(destination)
    }
}

/// Create a directory unless it already exists
fn ensure_dir(path: &Path) -> Result<(), ItemFailure> {
    if path.is_dir() {
        return Ok(());
    }

    debug!(path = %path.display(), "Creating working directory");
    fs::create_dir_all(path).map_err(|e| ItemFailure::Workspace {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Remove a working directory after a failed export, logging on failure
fn remove_work_dir(path: &Path) {
    if !path.exists() {
        return;
    }
    if let Err(e) = fs::remove_dir_all(path) {
        warn!(path = %path.display(), error = %e, "Couldn't remove working directory");
    }
}

/// The single artifact the exporter produced inside `work_dir`
fn locate_artifact(work_dir: &Path, produced: &Path) -> Result<PathBuf, ItemFailure> {
    if produced.is_file() && produced.parent() == Some(work_dir) {
        return Ok(produced.to_path_buf());
    }

    let files: Vec<PathBuf> = fs::read_dir(work_dir)
        .map_err(|e| ItemFailure::Workspace {
            path: work_dir.to_path_buf(),
            message: e.to_string(),
        })?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .collect();

    match files.as_slice() {
        [single] => Ok(single.clone()),
        [] => Err(ItemFailure::Artifact(format!(
            "export produced no file in {}",
            work_dir.display()
        ))),
        many => Err(ItemFailure::Artifact(format!(
            "expected one file in {}, found {}",
            work_dir.display(),
            many.len()
        ))),
    }
}
