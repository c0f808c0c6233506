//! Archive verification
//!
//! An archive only counts as a backup once it opens as a zip package with
//! at least one readable entry.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::VerifyError;

/// Facts about an archive that passed verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedArchive {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub entries: usize,
}

/// Check that the file at `path` is a well-formed, non-empty zip package
pub fn verify_archive(path: &Path) -> Result<VerifiedArchive, VerifyError> {
    let metadata = match fs::metadata(path) {
        Ok(m) if m.is_file() => m,
        _ => return Err(VerifyError::Missing(path.to_path_buf())),
    };

    if metadata.len() == 0 {
        return Err(VerifyError::Empty(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| VerifyError::Corrupt(e.to_string()))?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|e| VerifyError::Corrupt(e.to_string()))?;

    if archive.len() == 0 {
        return Err(VerifyError::NoEntries(path.to_path_buf()));
    }

    // Reading each header catches truncated central directories
    for index in 0..archive.len() {
        archive
            .by_index(index)
            .map_err(|e| VerifyError::Corrupt(format!("entry {}: {}", index, e)))?;
    }

    Ok(VerifiedArchive {
        path: path.to_path_buf(),
        size_bytes: metadata.len(),
        entries: archive.len(),
    })
}
