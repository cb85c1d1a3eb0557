//! Batch ingestion from a JSON-lines manifest.
//!
//! Entries are ingested concurrently through one shared gate, at most
//! `concurrency` at a time. Results come back in manifest order.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thirds_core::{GateError, ImageSource, IngestOutcome, SharedGate};
use thirds_types::{SubmissionId, UserId};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::CliError;

/// One manifest line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    /// Unique submission id.
    pub submission: String,
    /// Submitting user id.
    pub user: String,
    /// Image path or `http(s)` URL.
    pub source: String,
}

/// Outcome of one manifest entry.
#[derive(Debug)]
pub struct EntryResult {
    /// The entry as read from the manifest.
    pub entry: ManifestEntry,
    /// What the gate did with it.
    pub outcome: Result<IngestOutcome, GateError>,
}

/// Counts over a finished batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Entries scored and committed.
    pub recorded: usize,
    /// Entries skipped as already processed.
    pub skipped: usize,
    /// Entries that failed.
    pub failed: usize,
}

impl BatchSummary {
    /// Tally a list of results.
    pub fn of(results: &[EntryResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            match &r.outcome {
                Ok(IngestOutcome::Recorded(_)) => acc.recorded = acc.recorded.saturating_add(1),
                Ok(IngestOutcome::Skipped(_)) => acc.skipped = acc.skipped.saturating_add(1),
                Err(_) => acc.failed = acc.failed.saturating_add(1),
            }
            acc
        })
    }

    /// Total number of entries.
    pub const fn total(&self) -> usize {
        self.recorded
            .saturating_add(self.skipped)
            .saturating_add(self.failed)
    }
}

/// Parse manifest text. Blank lines and lines starting with `#` are ignored.
///
/// # Errors
///
/// Returns [`CliError::ManifestLine`] for the first malformed line.
pub fn parse_manifest(raw: &str) -> Result<Vec<ManifestEntry>, CliError> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| CliError::ManifestLine {
                line: index.saturating_add(1),
                source,
            })
        })
        .collect()
}

/// Read and parse a manifest file.
///
/// # Errors
///
/// Returns [`CliError::ManifestIo`] if the file cannot be read, or
/// [`CliError::ManifestLine`] for the first malformed line.
pub async fn load_manifest(path: &Path) -> Result<Vec<ManifestEntry>, CliError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::ManifestIo {
            path: path.to_path_buf(),
            source,
        })?;
    parse_manifest(&raw)
}

/// Ingest every entry through `gate`, `concurrency` at a time.
pub async fn run(
    gate: &SharedGate,
    entries: Vec<ManifestEntry>,
    concurrency: usize,
) -> Vec<EntryResult> {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let total = entries.len();
    let mut tasks = JoinSet::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let gate = Arc::clone(gate);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let outcome = match permits.acquire_owned().await {
                Ok(_permit) => {
                    let source = ImageSource::parse(&entry.source);
                    gate.ingest_source(
                        &SubmissionId::new(entry.submission.as_str()),
                        &UserId::new(entry.user.as_str()),
                        &source,
                    )
                    .await
                }
                Err(closed) => Err(GateError::Internal(closed.to_string())),
            };
            (index, EntryResult { entry, outcome })
        });
    }

    let mut results: Vec<(usize, EntryResult)> = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(done) => results.push(done),
            Err(e) => debug!(error = %e, "batch task did not complete"),
        }
    }
    results.sort_by_key(|(index, _)| *index);

    let results: Vec<EntryResult> = results.into_iter().map(|(_, r)| r).collect();
    let summary = BatchSummary::of(&results);
    info!(
        total,
        recorded = summary.recorded,
        skipped = summary.skipped,
        failed = summary.failed,
        "batch finished"
    );
    results
}
