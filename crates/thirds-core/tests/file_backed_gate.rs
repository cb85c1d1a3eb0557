//! The gate running against a real ledger file.
//!
//! Exercises restart behavior: what survives in the JSON file and what lives
//! only in process memory.

#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]

use std::io::Cursor;
use std::path::Path;

use chrono::{DateTime, Duration, TimeZone, Utc};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use thirds_core::config::ScoringConfig;
use thirds_core::{
    Clock, GateError, ImageSource, IngestOutcome, ManualClock, ResetOutcome, SubmissionGate,
};
use thirds_store::LedgerStore;
use thirds_types::{SubmissionId, UserId};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 18, 0, 0).unwrap()
}

/// Dark 90x60 frame with a bright 9x9 square centred at `(cx, cy)`.
fn photo(cx: u32, cy: u32) -> Vec<u8> {
    let mut img = RgbImage::from_pixel(90, 60, Rgb([20, 20, 20]));
    for y in cy - 4..=cy + 4 {
        for x in cx - 4..=cx + 4 {
            img.put_pixel(x, y, Rgb([240, 240, 240]));
        }
    }
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

async fn open(path: &Path, clock: &ManualClock) -> SubmissionGate {
    SubmissionGate::open(
        LedgerStore::json(path),
        &ScoringConfig::default(),
        Clock::Manual(clock.clone()),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn ledger_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.json");
    let clock = ManualClock::new(start());

    {
        let gate = open(&path, &clock).await;
        let alice = UserId::new("alice");
        gate.ingest(&SubmissionId::new("1"), &alice, photo(30, 20))
            .await
            .unwrap();
        clock.advance(Duration::days(1));
        gate.ingest(&SubmissionId::new("2"), &alice, photo(45, 30))
            .await
            .unwrap();
        gate.ingest(&SubmissionId::new("3"), &UserId::new("bob"), photo(60, 40))
            .await
            .unwrap();
    }

    let gate = open(&path, &clock).await;
    let ledger = gate.snapshot().await;
    assert_eq!(ledger.len(), 3);
    ledger.verify().unwrap();

    assert_eq!(gate.rank(&UserId::new("bob")).await.unwrap().position, 1);
    assert_eq!(gate.streak(&UserId::new("alice")).await, 2);
    assert_eq!(gate.top_images(3).await.len(), 3);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["images"][0]["user"], "alice");
    assert_eq!(raw["users"]["alice"]["dates"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn idempotence_does_not_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.json");
    let clock = ManualClock::new(start());
    let id = SubmissionId::new("same");
    let user = UserId::new("u");

    let first = open(&path, &clock).await;
    first.ingest(&id, &user, photo(30, 20)).await.unwrap();
    let again = first.ingest(&id, &user, photo(30, 20)).await.unwrap();
    assert!(again.event().is_none());
    drop(first);

    let second = open(&path, &clock).await;
    let rescored = second.ingest(&id, &user, photo(30, 20)).await.unwrap();
    assert!(matches!(rescored, IngestOutcome::Recorded(_)));
    assert_eq!(second.snapshot().await.len(), 2);
}

#[tokio::test]
async fn ingest_from_local_source() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("upload.png");
    std::fs::write(&image_path, photo(60, 20)).unwrap();

    let gate = open(&dir.path().join("scores.json"), &ManualClock::new(start())).await;
    let outcome = gate
        .ingest_source(
            &SubmissionId::new("local"),
            &UserId::new("u"),
            &ImageSource::Path(image_path),
        )
        .await
        .unwrap();
    assert!(outcome.event().unwrap().score > 9.0);

    let err = gate
        .ingest_source(
            &SubmissionId::new("missing"),
            &UserId::new("u"),
            &ImageSource::Path(dir.path().join("nope.png")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GateError::Fetch(_)));
}

#[tokio::test]
async fn reset_is_written_through() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.json");
    let clock = ManualClock::new(start());

    let gate = open(&path, &clock).await;
    gate.ingest(&SubmissionId::new("1"), &UserId::new("gone"), photo(30, 40))
        .await
        .unwrap();
    assert_eq!(
        gate.reset(&UserId::new("gone")).await.unwrap(),
        ResetOutcome::Cleared { events_removed: 1 }
    );
    drop(gate);

    let reopened = open(&path, &clock).await;
    assert!(reopened.snapshot().await.is_empty());
    assert_eq!(reopened.average(&UserId::new("gone")).await, None);
}

#[tokio::test]
async fn corrupt_ledger_file_refuses_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.json");
    std::fs::write(&path, "{ this is not json").unwrap();

    let err = SubmissionGate::open(
        LedgerStore::json(&path),
        &ScoringConfig::default(),
        Clock::manual(start()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "persistence");
}
