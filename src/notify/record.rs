//! The coordination file shared by concurrent invocations

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::{Result, VolumenError};

/// File at a well-known path holding the latest popup body
///
/// There is no lock: processes only create, overwrite, read, delete and
/// stat it. Any I/O failure other than "not found" is fatal.
#[derive(Debug, Clone)]
pub struct CoordinationRecord {
    path: PathBuf,
}

impl CoordinationRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Time since the last write, or `None` if the record does not exist
    ///
    /// A modification time in the future counts as zero age.
    pub fn age(&self) -> Result<Option<Duration>> {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(VolumenError::coordination(&self.path, "inspected", e)),
        };
        let modified = metadata
            .modified()
            .map_err(|e| VolumenError::coordination(&self.path, "inspected", e))?;

        Ok(Some(
            SystemTime::now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO),
        ))
    }

    /// Create or overwrite the record with `body`
    pub fn write(&self, body: &str) -> Result<()> {
        std::fs::write(&self.path, body)
            .map_err(|e| VolumenError::coordination(&self.path, "written", e))
    }

    /// Current content, or `None` if the record does not exist
    ///
    /// Bytes that are not UTF-8 are replaced rather than rejected.
    pub fn read(&self) -> Result<Option<String>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VolumenError::coordination(&self.path, "read", e)),
        }
    }

    /// Delete the record; a record that is already gone is fine
    pub fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VolumenError::coordination(&self.path, "removed", e)),
        }
    }
}
