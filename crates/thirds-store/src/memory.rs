//! In-process ledger store.
//!
//! Holds the serialized document in memory. Used by tests and by one-shot
//! runs that should not touch disk. Clones share the same backing slot, so a
//! test can keep a handle and inspect what the gate persisted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thirds_types::LedgerDocument;
use tokio::sync::Mutex;

use crate::error::StoreError;

/// A ledger store backed by a shared in-memory JSON string.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryStore {
    /// An empty store, equivalent to a missing ledger file.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with raw JSON, as if read from a file.
    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(raw.into()))),
            fail_saves: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make subsequent saves fail with [`StoreError::Unavailable`].
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The raw JSON of the last successful save.
    pub async fn contents(&self) -> Option<String> {
        self.slot.lock().await.clone()
    }

    /// Parse the stored document, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if the stored text is not a
    /// ledger document.
    pub async fn load(&self) -> Result<Option<LedgerDocument>, StoreError> {
        let guard = self.slot.lock().await;
        guard
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(StoreError::from)
    }

    /// Replace the stored document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] while failure injection is on.
    pub async fn save(&self, document: &LedgerDocument) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store is refusing writes".to_owned(),
            ));
        }
        let raw = serde_json::to_string(document)?;
        *self.slot.lock().await = Some(raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[tokio::test]
    async fn clones_share_contents() {
        let store = MemoryStore::new();
        let handle = store.clone();
        assert!(handle.load().await.unwrap().is_none());

        store.save(&LedgerDocument::empty()).await.unwrap();
        assert_eq!(handle.load().await.unwrap(), Some(LedgerDocument::empty()));
    }

    #[tokio::test]
    async fn failure_injection_keeps_previous_contents() {
        let store = MemoryStore::with_contents(r#"{"images": [], "users": {}}"#);
        let before = store.contents().await;

        store.set_fail_saves(true);
        let err = store.save(&LedgerDocument::empty()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.contents().await, before);

        store.set_fail_saves(false);
        store.save(&LedgerDocument::empty()).await.unwrap();
    }
}
