//! The persisted ledger document.
//!
//! ```text
//! {
//!   "images": [ { "user": "<id>", "score": <float>, "ts": "<ISO-8601 UTC>" }, ... ],
//!   "users":  { "<id>": { "scores": [<float>, ...], "dates": ["<YYYY-MM-DD>", ...] }, ... }
//! }
//! ```
//!
//! This is the raw wire shape. It carries no invariants of its own; the
//! ledger validates it on the way in.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::structs::ScoreEvent;

/// Top-level persisted document.
///
/// `users` keeps key order across a save/load cycle so rank tie-breaks
/// (first-seen order) survive restarts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerDocument {
    /// Every score event, oldest first.
    pub images: Vec<ScoreEvent>,
    /// Per-user rollups keyed by user id.
    pub users: IndexMap<UserId, UserRow>,
}

/// Persisted per-user rollup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserRow {
    /// Scores in recording order.
    pub scores: Vec<f64>,
    /// Active UTC dates.
    pub dates: Vec<NaiveDate>,
}

impl LedgerDocument {
    /// An empty document (fresh install).
    pub fn empty() -> Self {
        Self::default()
    }
}
