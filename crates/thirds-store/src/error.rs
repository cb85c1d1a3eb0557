//! Error types for the persistence layer.
//!
//! All errors are propagated via [`StoreError`], which wraps the underlying
//! I/O, JSON, and ledger validation errors with the path involved.

use std::path::PathBuf;

use thirds_ledger::LedgerError;

/// Errors that can occur while loading or saving the ledger.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The stored bytes are not a well-formed ledger document.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored document parsed but violates the ledger invariants.
    #[error("Stored ledger is inconsistent: {0}")]
    Invalid(#[from] LedgerError),

    /// The store refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
