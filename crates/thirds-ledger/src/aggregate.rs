//! Read-only queries over a [`Ledger`].
//!
//! Nothing here holds state of its own; every answer is recomputed from the
//! ledger passed in. "No data" is an ordinary answer (`None`, an empty
//! board, a zero streak), never an error.
//!
//! # Ordering
//!
//! Per-user boards sort by average, highest first. The sort is stable, so
//! equal averages keep the order users first appeared in the ledger (for
//! windowed boards: the order of their first event inside the window).
//! The image board sorts by score with the same rule over event order.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use indexmap::IndexMap;
use thirds_types::{LeaderboardEntry, RankedImage, Ranking, UserId, mean};
use tracing::debug;

use crate::Ledger;

/// Length of the weekly leaderboard window, in days.
pub const WEEK_DAYS: i64 = 7;

/// The weekly leaderboard window.
pub fn week() -> Duration {
    Duration::days(WEEK_DAYS)
}

/// Lifetime average for one user, or `None` without scores.
pub fn average(ledger: &Ledger, user_id: &UserId) -> Option<f64> {
    ledger.user(user_id).and_then(|record| record.average())
}

/// Every user with at least one score, best average first.
pub fn all_time_board(ledger: &Ledger) -> Vec<LeaderboardEntry> {
    let rows = ledger.users().iter().filter_map(|(user_id, record)| {
        record
            .average()
            .map(|avg| (user_id.clone(), avg, record.image_count()))
    });
    build_board(rows)
}

/// A user's 1-based all-time rank, or `None` if unranked.
pub fn rank(ledger: &Ledger, user_id: &UserId) -> Option<Ranking> {
    let board = all_time_board(ledger);
    let of = board.len();
    board
        .into_iter()
        .find(|entry| &entry.user_id == user_id)
        .map(|entry| Ranking {
            position: entry.position,
            average: entry.average,
            of,
        })
}

/// The `n` best all-time averages.
pub fn top_users(ledger: &Ledger, n: usize) -> Vec<LeaderboardEntry> {
    let mut board = all_time_board(ledger);
    board.truncate(n);
    board
}

/// The `n` highest-scoring individual images; earlier events win ties.
pub fn top_images(ledger: &Ledger, n: usize) -> Vec<RankedImage> {
    let mut events: Vec<_> = ledger.events().iter().collect();
    events.sort_by(|a, b| b.score.total_cmp(&a.score));
    events
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(index, event)| RankedImage {
            position: index.saturating_add(1),
            event: event.clone(),
        })
        .collect()
}

/// The `n` best averages over events strictly after `since`.
///
/// Users with no events in the window are left off the board.
pub fn window_top(ledger: &Ledger, n: usize, since: DateTime<Utc>) -> Vec<LeaderboardEntry> {
    let mut recent: IndexMap<&UserId, Vec<f64>> = IndexMap::new();
    for event in ledger.events().iter().filter(|e| e.timestamp > since) {
        recent.entry(&event.user_id).or_default().push(event.score);
    }
    debug!(%since, users = recent.len(), "windowed leaderboard");

    let rows = recent.into_iter().filter_map(|(user_id, scores)| {
        mean(&scores).map(|avg| (user_id.clone(), avg, scores.len()))
    });
    let mut board = build_board(rows);
    board.truncate(n);
    board
}

/// The `n` best averages over the seven days before `now`.
pub fn weekly_top(ledger: &Ledger, n: usize, now: DateTime<Utc>) -> Vec<LeaderboardEntry> {
    let since = now
        .checked_sub_signed(week())
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    window_top(ledger, n, since)
}

/// Consecutive active days ending on `today`.
///
/// Zero when the user did not post on `today` itself.
pub fn streak(ledger: &Ledger, user_id: &UserId, today: NaiveDate) -> u32 {
    let Some(record) = ledger.user(user_id) else {
        return 0;
    };

    let mut count: u32 = 0;
    let mut day = today;
    while record.is_active_on(day) {
        count = count.saturating_add(1);
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    count
}

/// [`streak`] evaluated at the UTC date of `now`.
pub fn streak_at(ledger: &Ledger, user_id: &UserId, now: DateTime<Utc>) -> u32 {
    streak(ledger, user_id, now.date_naive())
}

/// Stable-sort `(user, average, images)` rows into a numbered board.
fn build_board(rows: impl Iterator<Item = (UserId, f64, usize)>) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<_> = rows.collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));
    rows.into_iter()
        .enumerate()
        .map(|(index, (user_id, average, images))| LeaderboardEntry {
            position: index.saturating_add(1),
            user_id,
            average,
            images,
        })
        .collect()
}
