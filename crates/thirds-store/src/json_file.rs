//! Whole-file JSON persistence.
//!
//! The ledger is small enough to rewrite in full on every mutation. Writes
//! go to a sibling temp file first and are then renamed over the target, so
//! a crash mid-write leaves the previous version intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thirds_types::LedgerDocument;
use tracing::debug;

use crate::error::StoreError;

/// Suffix appended to the target file name for in-flight writes.
const TEMP_SUFFIX: &str = "tmp";

/// A ledger document stored as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store bound to `path`. Nothing is touched until the first
    /// load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored document, or `None` if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read, and
    /// [`StoreError::Serialization`] if its contents are not a ledger
    /// document.
    pub async fn load(&self) -> Result<Option<LedgerDocument>, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no ledger file yet");
                return Ok(None);
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let document: LedgerDocument = serde_json::from_slice(&raw)?;
        debug!(
            path = %self.path.display(),
            images = document.images.len(),
            users = document.users.len(),
            "loaded ledger file"
        );
        Ok(Some(document))
    }

    /// Replace the stored document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the temp file cannot be written or
    /// renamed into place. The previous file is left untouched in that case.
    pub async fn save(&self, document: &LedgerDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let payload = serde_json::to_vec_pretty(document)?;
        let temp_path = self.temp_path();

        tokio::fs::write(&temp_path, &payload)
            .await
            .map_err(|e| StoreError::io(&temp_path, e))?;

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            // Best effort; the rename error is the one worth reporting.
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StoreError::io(&self.path, e));
        }

        debug!(
            path = %self.path.display(),
            bytes = payload.len(),
            images = document.images.len(),
            "saved ledger file"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".");
        name.push(TEMP_SUFFIX);
        self.path.with_file_name(name)
    }
}
