//! Ledger persistence for the Thirds composition scorer.
//!
//! The whole ledger is one JSON document. It is read once at startup and
//! rewritten in full after every committed mutation.
//!
//! # Modules
//!
//! - [`json_file`] -- Pretty JSON on disk, replaced atomically via temp file + rename
//! - [`memory`] -- Shared in-memory document for tests and dry runs
//! - [`error`] -- Shared error types
//!
//! # Backends
//!
//! [`LedgerStore`] dispatches over the concrete backends with a plain enum
//! rather than a trait object, so async methods need no boxing.

pub mod error;
pub mod json_file;
pub mod memory;

use std::path::PathBuf;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use thirds_ledger::Ledger;
use thirds_types::LedgerDocument;
use tracing::info;

/// Where the ledger lives.
#[derive(Debug, Clone)]
pub enum LedgerStore {
    /// A JSON file on disk.
    Json(JsonFileStore),
    /// An in-process document.
    Memory(MemoryStore),
}

impl LedgerStore {
    /// A file-backed store at `path`.
    pub fn json(path: impl Into<PathBuf>) -> Self {
        Self::Json(JsonFileStore::new(path))
    }

    /// Short backend name for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Memory(_) => "memory",
        }
    }

    /// Read the raw stored document, `None` if nothing is stored yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read or parsed.
    pub async fn load_document(&self) -> Result<Option<LedgerDocument>, StoreError> {
        match self {
            Self::Json(store) => store.load().await,
            Self::Memory(store) => store.load().await,
        }
    }

    /// Load and validate the ledger. A missing document is an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] if the stored rollups disagree with
    /// the stored events, or any load error from the backend.
    pub async fn load_ledger(&self) -> Result<Ledger, StoreError> {
        let ledger = match self.load_document().await? {
            Some(document) => Ledger::from_document(document)?,
            None => Ledger::new(),
        };
        info!(
            backend = self.kind(),
            events = ledger.len(),
            users = ledger.users().len(),
            "ledger loaded"
        );
        Ok(ledger)
    }

    /// Persist the full ledger.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend rejects the write. The
    /// previously stored document is unchanged in that case.
    pub async fn save_ledger(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let document = ledger.to_document();
        match self {
            Self::Json(store) => store.save(&document).await,
            Self::Memory(store) => store.save(&document).await,
        }
    }
}

impl From<JsonFileStore> for LedgerStore {
    fn from(store: JsonFileStore) -> Self {
        Self::Json(store)
    }
}

impl From<MemoryStore> for LedgerStore {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}
