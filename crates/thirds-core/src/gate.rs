//! The submission gate: the only writer of the ledger.
//!
//! [`SubmissionGate`] owns the in-memory [`Ledger`], the [`LedgerStore`] it
//! persists to, and the [`ProcessedSet`] that keeps a submission from being
//! scored twice.
//!
//! # Ingest sequence
//!
//! ```text
//! claim id ──(already claimed)──> Skipped
//!    │
//!    ├── fetch bytes          (no lock, fetch deadline)
//!    ├── decode + score       (blocking pool, scoring deadline, no lock)
//!    └── write lock
//!          ├── clone ledger, append event
//!          ├── persist clone  ──(error)──> Persistence, ledger unchanged
//!          └── swap clone in
//! ```
//!
//! Resets follow the same clone, persist, swap discipline. Queries take the
//! read lock and see either the state before a mutation or after it, never
//! a half-applied one.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thirds_ledger::{Ledger, aggregate};
use thirds_scoring::{CompositionReport, ImageDecoder, score_bytes};
use thirds_store::LedgerStore;
use thirds_types::{LeaderboardEntry, RankedImage, Ranking, ScoreEvent, SubmissionId, UserId};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::ScoringConfig;
use crate::error::GateError;
use crate::fetch::{ImageFetcher, ImageSource};
use crate::processed::ProcessedSet;

/// Why a submission produced no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// This process already took the submission on.
    AlreadyProcessed,
}

/// Result of a successful ingest call.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// The submission was scored and the event committed.
    Recorded(ScoreEvent),
    /// Nothing was done.
    Skipped(SkipReason),
}

impl IngestOutcome {
    /// The committed event, if any.
    pub const fn event(&self) -> Option<&ScoreEvent> {
        match self {
            Self::Recorded(event) => Some(event),
            Self::Skipped(_) => None,
        }
    }
}

/// Result of a reset call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The user's rollup and events were removed and the removal persisted.
    Cleared {
        /// Number of events purged.
        events_removed: usize,
    },
    /// The user had no data; nothing changed.
    UnknownUser,
}

/// Owns the ledger and serializes every mutation of it.
#[derive(Debug)]
pub struct SubmissionGate {
    ledger: RwLock<Ledger>,
    store: LedgerStore,
    processed: ProcessedSet,
    decoder: ImageDecoder,
    fetcher: ImageFetcher,
    clock: Clock,
    decode_timeout: Duration,
}

impl SubmissionGate {
    /// Load the ledger from `store` and build a gate around it.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Persistence`] if the stored ledger cannot be
    /// read or fails validation.
    pub async fn open(
        store: LedgerStore,
        scoring: &ScoringConfig,
        clock: Clock,
    ) -> Result<Self, GateError> {
        let ledger = store.load_ledger().await?;
        Ok(Self::with_ledger(ledger, store, scoring, clock))
    }

    /// Build a gate around an already loaded ledger.
    pub fn with_ledger(
        ledger: Ledger,
        store: LedgerStore,
        scoring: &ScoringConfig,
        clock: Clock,
    ) -> Self {
        Self {
            ledger: RwLock::new(ledger),
            store,
            processed: ProcessedSet::new(),
            decoder: ImageDecoder::new(scoring.max_image_bytes),
            fetcher: ImageFetcher::new(scoring.fetch_timeout(), scoring.max_image_bytes),
            clock,
            decode_timeout: scoring.decode_timeout(),
        }
    }

    /// The clock used to stamp events and evaluate "now".
    pub const fn clock(&self) -> &Clock {
        &self.clock
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Score `bytes` for `user` and commit the event, unless `submission`
    /// was already taken on by this process.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Decode`] or [`GateError::ScoringTimeout`] if the
    /// bytes cannot be scored, and [`GateError::Persistence`] if the ledger
    /// cannot be saved. In every error case the ledger is unchanged and the
    /// submission stays claimed.
    pub async fn ingest(
        &self,
        submission: &SubmissionId,
        user: &UserId,
        bytes: Vec<u8>,
    ) -> Result<IngestOutcome, GateError> {
        if !self.processed.claim(submission) {
            debug!(%submission, "submission already processed, skipping");
            return Ok(IngestOutcome::Skipped(SkipReason::AlreadyProcessed));
        }
        self.score_and_commit(submission, user, bytes).await
    }

    /// Like [`Self::ingest`], fetching the bytes from `source` first.
    ///
    /// The submission is claimed before the fetch starts.
    ///
    /// # Errors
    ///
    /// Adds [`GateError::FetchTimeout`] and [`GateError::Fetch`] to the
    /// failures of [`Self::ingest`].
    pub async fn ingest_source(
        &self,
        submission: &SubmissionId,
        user: &UserId,
        source: &ImageSource,
    ) -> Result<IngestOutcome, GateError> {
        if !self.processed.claim(submission) {
            debug!(%submission, "submission already processed, skipping");
            return Ok(IngestOutcome::Skipped(SkipReason::AlreadyProcessed));
        }

        let bytes = self.fetcher.fetch(source).await.map_err(|e| {
            let err = GateError::from(e);
            warn!(%submission, %user, %source, kind = err.kind(), error = %err, "fetch failed");
            err
        })?;
        self.score_and_commit(submission, user, bytes).await
    }

    /// Remove every score `user` owns.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Persistence`] if the removal cannot be saved;
    /// the user's data is kept in that case.
    pub async fn reset(&self, user: &UserId) -> Result<ResetOutcome, GateError> {
        let mut ledger = self.ledger.write().await;

        let mut next = ledger.clone();
        let Some(removed) = next.remove_user(user) else {
            debug!(%user, "reset requested for unknown user");
            return Ok(ResetOutcome::UnknownUser);
        };

        self.store.save_ledger(&next).await.map_err(|e| {
            warn!(%user, error = %e, "reset not persisted, keeping user data");
            GateError::from(e)
        })?;
        *ledger = next;

        info!(%user, events_removed = removed.events_removed, "user reset");
        Ok(ResetOutcome::Cleared {
            events_removed: removed.events_removed,
        })
    }

    // -----------------------------------------------------------------------
    // Scoring without recording
    // -----------------------------------------------------------------------

    /// Decode and score `bytes` on the blocking pool under the scoring
    /// deadline. Touches neither the ledger nor the processed set.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Decode`], [`GateError::ScoringTimeout`], or
    /// [`GateError::Internal`] if the blocking task dies.
    pub async fn score(&self, bytes: Vec<u8>) -> Result<CompositionReport, GateError> {
        let decoder = self.decoder;
        let task = tokio::task::spawn_blocking(move || score_bytes(&decoder, &bytes));

        match tokio::time::timeout(self.decode_timeout, task).await {
            Ok(Ok(result)) => result.map_err(GateError::from),
            Ok(Err(join)) => Err(GateError::Internal(format!("scoring task failed: {join}"))),
            Err(_elapsed) => Err(GateError::ScoringTimeout {
                timeout_ms: u64::try_from(self.decode_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    /// Fetch and score `source` without recording anything.
    ///
    /// # Errors
    ///
    /// Same as [`Self::score`] plus the fetch failures.
    pub async fn score_source(&self, source: &ImageSource) -> Result<CompositionReport, GateError> {
        let bytes = self.fetcher.fetch(source).await?;
        self.score(bytes).await
    }

    async fn score_and_commit(
        &self,
        submission: &SubmissionId,
        user: &UserId,
        bytes: Vec<u8>,
    ) -> Result<IngestOutcome, GateError> {
        let report = self.score(bytes).await.map_err(|err| {
            warn!(%submission, %user, kind = err.kind(), error = %err, "submission rejected");
            err
        })?;

        let event = ScoreEvent::new(user.clone(), report.score, self.clock.now());

        let mut ledger = self.ledger.write().await;
        let mut next = ledger.clone();
        let recorded = next.record(event)?.clone();

        self.store.save_ledger(&next).await.map_err(|e| {
            warn!(%submission, %user, error = %e, "score not persisted, event dropped");
            GateError::from(e)
        })?;
        *ledger = next;
        drop(ledger);

        info!(
            %submission,
            %user,
            score = recorded.score,
            width = report.width,
            height = report.height,
            "submission scored"
        );
        Ok(IngestOutcome::Recorded(recorded))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// A copy of the current ledger.
    pub async fn snapshot(&self) -> Ledger {
        self.ledger.read().await.clone()
    }

    /// Lifetime average for `user`.
    pub async fn average(&self, user: &UserId) -> Option<f64> {
        aggregate::average(&*self.ledger.read().await, user)
    }

    /// All-time rank for `user`.
    pub async fn rank(&self, user: &UserId) -> Option<Ranking> {
        aggregate::rank(&*self.ledger.read().await, user)
    }

    /// The `n` best lifetime averages.
    pub async fn top_users(&self, n: usize) -> Vec<LeaderboardEntry> {
        aggregate::top_users(&*self.ledger.read().await, n)
    }

    /// The `n` best single images.
    pub async fn top_images(&self, n: usize) -> Vec<RankedImage> {
        aggregate::top_images(&*self.ledger.read().await, n)
    }

    /// The `n` best averages over the last seven days.
    pub async fn weekly_top(&self, n: usize) -> Vec<LeaderboardEntry> {
        self.weekly_top_at(n, self.clock.now()).await
    }

    /// [`Self::weekly_top`] evaluated at an explicit instant.
    pub async fn weekly_top_at(&self, n: usize, now: DateTime<Utc>) -> Vec<LeaderboardEntry> {
        aggregate::weekly_top(&*self.ledger.read().await, n, now)
    }

    /// Consecutive posting days for `user`, ending today.
    pub async fn streak(&self, user: &UserId) -> u32 {
        aggregate::streak(&*self.ledger.read().await, user, self.clock.today())
    }
}

/// A gate shared between concurrent callers.
pub type SharedGate = Arc<SubmissionGate>;
