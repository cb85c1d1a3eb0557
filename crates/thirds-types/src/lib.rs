//! Shared type definitions for the Thirds composition scorer.
//!
//! This crate is the single source of truth for the records that flow
//! between the scorer, the ledger, the store, and the submission gate.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for user and submission identifiers
//! - [`structs`] -- Score events, user rollups, and query result rows
//! - [`document`] -- The persisted JSON document shape
//! - [`timestamp`] -- Serde codec for persisted timestamps

pub mod document;
pub mod ids;
pub mod structs;
pub mod timestamp;

// Re-export all public types at crate root for convenience.
pub use document::{LedgerDocument, UserRow};
pub use ids::{SubmissionId, UserId};
pub use structs::{
    LeaderboardEntry, MAX_SCORE, MIN_SCORE, RankedImage, Ranking, ScoreEvent, UserRecord,
    is_valid_score, mean,
};
