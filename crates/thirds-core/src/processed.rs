//! Submission idempotence guard.
//!
//! Remembers which submissions this process has already taken on. The set
//! lives in memory only: after a restart a resubmitted id is scored again.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use thirds_types::SubmissionId;

/// Submission ids claimed by this process.
#[derive(Debug, Default)]
pub struct ProcessedSet {
    seen: Mutex<HashSet<SubmissionId>>,
}

impl ProcessedSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id` for processing.
    ///
    /// Returns `true` for the first caller only. The check and the insert
    /// happen under one lock, so two racing callers cannot both win.
    /// A claim is never released, even if processing later fails.
    pub fn claim(&self, id: &SubmissionId) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        if seen.contains(id) {
            return false;
        }
        seen.insert(id.clone())
    }

    /// Whether `id` has been claimed.
    pub fn contains(&self, id: &SubmissionId) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    /// Number of claimed ids.
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been claimed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
