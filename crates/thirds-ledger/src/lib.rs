//! Score ledger and aggregation queries for the Thirds composition scorer.
//!
//! Every accepted submission produces one [`ScoreEvent`] appended to the
//! ledger. Per-user rollups are derived from those events and kept in step
//! with them; the aggregation queries read both.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`Ledger`] struct: ordered event log plus user rollups.
//! - [`aggregate`] -- Read-only queries: averages, ranks, leaderboards, streaks.
//!
//! # Consistency
//!
//! For every user `u`:
//!
//! ```text
//! users[u].scores == [e.score for e in events if e.user == u]
//! ```
//!
//! The ledger never panics on bad input; it returns [`LedgerError`].
//! Documents loaded from storage are checked against the rule above before
//! they become a [`Ledger`].
//!
//! # Usage
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use thirds_ledger::{Ledger, aggregate};
//! use thirds_types::{ScoreEvent, UserId};
//!
//! let mut ledger = Ledger::new();
//! let alice = UserId::new("alice");
//! let when = Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).single().unwrap_or_default();
//!
//! ledger.record(ScoreEvent::new(alice.clone(), 8.0, when)).ok();
//! ledger.record(ScoreEvent::new(alice.clone(), 6.0, when)).ok();
//!
//! assert_eq!(aggregate::average(&ledger, &alice), Some(7.0));
//! assert_eq!(aggregate::streak(&ledger, &alice, when.date_naive()), 1);
//! ```
//!
//! [`ScoreEvent`]: thirds_types::ScoreEvent

pub mod aggregate;
pub mod ledger;

// Re-export primary types at crate root.
pub use ledger::{Ledger, RemovedUser};

use thirds_types::UserId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised when recording events or validating a stored document.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A score outside `[0, 10]` or not finite.
    #[error("score {score} is outside the 0-10 range")]
    InvalidScore {
        /// The rejected score.
        score: f64,
    },

    /// A stored event names a user with no rollup entry.
    #[error("event #{index} belongs to user {user_id} who has no user record")]
    OrphanEvent {
        /// Position of the event in the stored sequence.
        index: usize,
        /// The user named by the event.
        user_id: UserId,
    },

    /// A stored rollup disagrees with the events for that user.
    #[error(
        "user {user_id} rollup does not match the event log ({recorded} scores recorded, {expected} events)"
    )]
    ScoreMismatch {
        /// The inconsistent user.
        user_id: UserId,
        /// Number of scores in the user's rollup.
        recorded: usize,
        /// Number of events for the user.
        expected: usize,
    },

    /// An internal error that should not occur in normal operation.
    #[error("internal ledger error: {0}")]
    InternalError(&'static str),
}
