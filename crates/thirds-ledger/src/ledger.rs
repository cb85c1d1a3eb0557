//! The score ledger: an ordered event log with per-user rollups.
//!
//! The [`Ledger`] struct is the in-memory representation of everything
//! ever scored. It holds all [`ScoreEvent`] values in recording order and
//! the [`UserRecord`] rollups derived from them.
//!
//! # Design
//!
//! - **Append-mostly**: events are only removed wholesale, by user reset.
//! - **Derived rollups**: a user's scores and active dates are updated in
//!   the same call that appends the event.
//! - **First-seen order**: users are kept in the order they first scored;
//!   rank ties resolve by that order.

use indexmap::IndexMap;
use thirds_types::{LedgerDocument, ScoreEvent, UserId, UserRecord, UserRow, is_valid_score};
use tracing::debug;

use crate::LedgerError;

/// What a reset removed.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedUser {
    /// The user's rollup as it was before removal.
    pub record: UserRecord,
    /// Number of events purged from the log.
    pub events_removed: usize,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// All score events and the per-user rollups derived from them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    /// All events, in recording order.
    events: Vec<ScoreEvent>,
    /// Rollups keyed by user, in first-seen order.
    users: IndexMap<UserId, UserRecord>,
}

impl Ledger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events in the ledger.
    pub const fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the ledger has no events.
    pub const fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events, in recording order.
    pub fn events(&self) -> &[ScoreEvent] {
        &self.events
    }

    /// All user rollups, in first-seen order.
    pub const fn users(&self) -> &IndexMap<UserId, UserRecord> {
        &self.users
    }

    /// The rollup for one user.
    pub fn user(&self, user_id: &UserId) -> Option<&UserRecord> {
        self.users.get(user_id)
    }

    /// Append a scored event and fold it into the user's rollup.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidScore`] if the score is not a finite
    /// value in `[0, 10]`. The ledger is unchanged on error.
    pub fn record(&mut self, event: ScoreEvent) -> Result<&ScoreEvent, LedgerError> {
        if !is_valid_score(event.score) {
            return Err(LedgerError::InvalidScore { score: event.score });
        }

        self.users
            .entry(event.user_id.clone())
            .or_default()
            .absorb(&event);
        self.events.push(event);

        let recorded = self.events.last();
        if let Some(last) = recorded {
            debug!(user = %last.user_id, score = last.score, events = self.events.len(), "recorded score event");
        }
        recorded.ok_or(LedgerError::InternalError(
            "failed to retrieve event after append",
        ))
    }

    /// Remove a user's rollup and every event they own.
    ///
    /// Returns `None` when the user is unknown; the ledger is unchanged in
    /// that case. Remaining users keep their relative order.
    pub fn remove_user(&mut self, user_id: &UserId) -> Option<RemovedUser> {
        let record = self.users.shift_remove(user_id)?;
        let before = self.events.len();
        self.events.retain(|event| &event.user_id != user_id);
        let events_removed = before.saturating_sub(self.events.len());

        debug!(user = %user_id, events_removed, "removed user from ledger");
        Some(RemovedUser {
            record,
            events_removed,
        })
    }

    /// Check that every rollup matches the event log exactly.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn verify(&self) -> Result<(), LedgerError> {
        check_consistency(&self.events, &self.users)
    }

    /// Build a ledger from a stored document, validating it first.
    ///
    /// Duplicate dates in a stored rollup collapse to one.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when a score is out of range, an event names
    /// a user with no rollup, or a rollup's scores differ from the events.
    pub fn from_document(document: LedgerDocument) -> Result<Self, LedgerError> {
        for event in &document.images {
            if !is_valid_score(event.score) {
                return Err(LedgerError::InvalidScore { score: event.score });
            }
        }

        let users: IndexMap<UserId, UserRecord> = document
            .users
            .into_iter()
            .map(|(user_id, row)| {
                let record = UserRecord {
                    scores: row.scores,
                    active_dates: row.dates.into_iter().collect(),
                };
                (user_id, record)
            })
            .collect();

        check_consistency(&document.images, &users)?;

        Ok(Self {
            events: document.images,
            users,
        })
    }

    /// The persisted form of this ledger.
    pub fn to_document(&self) -> LedgerDocument {
        LedgerDocument {
            images: self.events.clone(),
            users: self
                .users
                .iter()
                .map(|(user_id, record)| {
                    let row = UserRow {
                        scores: record.scores.clone(),
                        dates: record.active_dates.iter().copied().collect(),
                    };
                    (user_id.clone(), row)
                })
                .collect(),
        }
    }
}

/// Compare each user's scores against that user's events, bit for bit.
fn check_consistency(
    events: &[ScoreEvent],
    users: &IndexMap<UserId, UserRecord>,
) -> Result<(), LedgerError> {
    let mut expected: IndexMap<&UserId, Vec<u64>> = IndexMap::new();
    for (index, event) in events.iter().enumerate() {
        if !users.contains_key(&event.user_id) {
            return Err(LedgerError::OrphanEvent {
                index,
                user_id: event.user_id.clone(),
            });
        }
        expected
            .entry(&event.user_id)
            .or_default()
            .push(event.score.to_bits());
    }

    for (user_id, record) in users {
        let from_events = expected.get(user_id).map_or(&[][..], Vec::as_slice);
        let matches = record.scores.len() == from_events.len()
            && record
                .scores
                .iter()
                .zip(from_events)
                .all(|(score, bits)| score.to_bits() == *bits);
        if !matches {
            return Err(LedgerError::ScoreMismatch {
                user_id: user_id.clone(),
                recorded: record.scores.len(),
                expected: from_events.len(),
            });
        }
    }

    Ok(())
}
