//! Plain-text rendering of gate results.
//!
//! Display names fall back to the raw user id; the CLI has no user
//! directory to resolve them against.

use std::fmt::Write;

use thirds_core::ResetOutcome;
use thirds_types::{LeaderboardEntry, RankedImage, Ranking, UserId};

/// `Image score: 7.25/10`
pub fn score_line(score: f64) -> String {
    format!("Image score: {score:.2}/10")
}

/// A user's lifetime average, or the no-data message.
pub fn average_line(average: Option<f64>) -> String {
    average.map_or_else(
        || "You have no scores yet.".to_owned(),
        |avg| format!("Your average image score: {avg:.2}/10"),
    )
}

/// A user's rank, or the unranked message.
pub fn rank_line(ranking: Option<&Ranking>) -> String {
    ranking.map_or_else(
        || "You're not ranked yet. Post an image!".to_owned(),
        |r| {
            format!(
                "You are #{} of {} with an average of {:.2}/10.",
                r.position, r.of, r.average
            )
        },
    )
}

/// A user leaderboard under `title`, or `empty` when there are no rows.
pub fn user_board(title: &str, entries: &[LeaderboardEntry], empty: &str) -> String {
    if entries.is_empty() {
        return empty.to_owned();
    }
    let mut out = title.to_owned();
    for entry in entries {
        let _ = write!(
            out,
            "\n{}",
            board_line(entry.position, &entry.user_id, entry.average)
        );
    }
    out
}

/// The best-images board.
pub fn image_board(title: &str, images: &[RankedImage]) -> String {
    if images.is_empty() {
        return "No images scored yet.".to_owned();
    }
    let mut out = title.to_owned();
    for image in images {
        let _ = write!(
            out,
            "\n{}",
            board_line(image.position, &image.event.user_id, image.event.score)
        );
    }
    out
}

/// A user's posting streak.
pub fn streak_line(streak: u32) -> String {
    if streak == 0 {
        "No current streak. Post an image today to start one!".to_owned()
    } else {
        format!("Your posting streak: {streak} day(s)!")
    }
}

/// The result of a reset.
pub fn reset_line(user: &UserId, outcome: ResetOutcome) -> String {
    match outcome {
        ResetOutcome::Cleared { events_removed } => {
            format!("Cleared scores for {user} ({events_removed} image(s) removed).")
        }
        ResetOutcome::UnknownUser => format!("No data found for {user}."),
    }
}

/// `Today's photo theme: ...`
pub fn daily_line(prompt: &str) -> String {
    format!("Today's photo theme: {prompt}")
}

fn board_line(position: usize, user: &UserId, score: f64) -> String {
    format!("#{position} {user} \u{2013} {score:.2}/10")
}
