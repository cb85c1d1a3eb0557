//! Core record types shared by the ledger, the store, and the gate.
//!
//! [`ScoreEvent`] doubles as the persisted `images[]` row, so its serde
//! field names (`user`, `score`, `ts`) are part of the on-disk format.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::timestamp;

/// Lowest score the composition scorer can produce.
pub const MIN_SCORE: f64 = 0.0;

/// Highest score the composition scorer can produce.
pub const MAX_SCORE: f64 = 10.0;

// ---------------------------------------------------------------------------
// ScoreEvent
// ---------------------------------------------------------------------------

/// One scored submission.
///
/// Immutable once recorded. Identity is the position in the ledger's event
/// sequence; there is no separate event id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEvent {
    /// The user who submitted the image.
    #[serde(rename = "user")]
    pub user_id: UserId,
    /// Composition score in `[0, 10]`.
    pub score: f64,
    /// When the score was recorded.
    #[serde(rename = "ts", with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl ScoreEvent {
    /// Create a new event.
    pub const fn new(user_id: UserId, score: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_id,
            score,
            timestamp,
        }
    }

    /// The UTC calendar date the event falls on.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

// ---------------------------------------------------------------------------
// UserRecord
// ---------------------------------------------------------------------------

/// Per-user rollup derived from that user's score events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserRecord {
    /// Every score the user received, in recording order.
    pub scores: Vec<f64>,
    /// UTC dates with at least one recorded score.
    pub active_dates: BTreeSet<NaiveDate>,
}

impl UserRecord {
    /// Create an empty record.
    pub const fn new() -> Self {
        Self {
            scores: Vec::new(),
            active_dates: BTreeSet::new(),
        }
    }

    /// Fold one event into the rollup.
    pub fn absorb(&mut self, event: &ScoreEvent) {
        self.scores.push(event.score);
        self.active_dates.insert(event.date());
    }

    /// Mean of all recorded scores, or `None` with no scores.
    pub fn average(&self) -> Option<f64> {
        mean(&self.scores)
    }

    /// Number of recorded scores.
    pub const fn image_count(&self) -> usize {
        self.scores.len()
    }

    /// Whether the user posted on `date`.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.active_dates.contains(&date)
    }
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// One row of a per-user leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position on the board.
    pub position: usize,
    /// The ranked user.
    pub user_id: UserId,
    /// Average score over the board's window.
    pub average: f64,
    /// Number of images contributing to the average.
    pub images: usize,
}

/// A user's all-time standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// 1-based rank among users with at least one score.
    pub position: usize,
    /// The user's lifetime average.
    pub average: f64,
    /// Number of users on the board.
    pub of: usize,
}

/// One row of the top-images board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedImage {
    /// 1-based position on the board.
    pub position: usize,
    /// The scored event.
    pub event: ScoreEvent,
}

/// Arithmetic mean of `values`, or `None` for an empty slice.
///
/// Sums left to right so repeated calls over the same sequence agree bit for
/// bit.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let count = u32::try_from(values.len()).map_or(f64::from(u32::MAX), f64::from);
    Some(values.iter().sum::<f64>() / count)
}

/// Whether `score` is a value the scorer could have produced.
pub fn is_valid_score(score: f64) -> bool {
    score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]

    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn absorb_keeps_one_date_per_day() {
        let user = UserId::new("u1");
        let mut record = UserRecord::new();
        record.absorb(&ScoreEvent::new(user.clone(), 4.0, at(2024, 1, 1, 9)));
        record.absorb(&ScoreEvent::new(user.clone(), 6.0, at(2024, 1, 1, 21)));
        record.absorb(&ScoreEvent::new(user, 8.0, at(2024, 1, 2, 0)));

        assert_eq!(record.image_count(), 3);
        assert_eq!(record.active_dates.len(), 2);
        assert_eq!(record.average(), Some(6.0));
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(UserRecord::new().average(), None);
    }

    #[test]
    fn score_validity_bounds() {
        assert!(is_valid_score(0.0));
        assert!(is_valid_score(10.0));
        assert!(!is_valid_score(10.5));
        assert!(!is_valid_score(-0.1));
        assert!(!is_valid_score(f64::NAN));
    }

    #[test]
    fn event_serializes_with_wire_names() {
        let event = ScoreEvent::new(UserId::new("42"), 7.5, at(2024, 1, 3, 12));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["user"], "42");
        assert_eq!(value["score"], 7.5);
        assert_eq!(value["ts"], "2024-01-03T12:00:00Z");
    }
}
