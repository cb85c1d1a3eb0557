//! Errors surfaced by the submission gate.
//!
//! Each variant is a distinguishable failure kind for the caller. Skipping
//! an already-processed submission is not an error; see
//! [`IngestOutcome::Skipped`](crate::gate::IngestOutcome::Skipped).

use thirds_ledger::LedgerError;
use thirds_scoring::ScoringError;
use thirds_store::StoreError;

use crate::fetch::FetchError;

/// Failure of a gate operation.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The bytes were empty, oversized, or not a decodable image.
    #[error("decode error: {0}")]
    Decode(#[from] ScoringError),

    /// Fetching the image did not finish in time.
    #[error("timed out fetching {location} after {timeout_ms} ms")]
    FetchTimeout {
        /// The URL or path being fetched.
        location: String,
        /// The configured deadline.
        timeout_ms: u64,
    },

    /// Fetching the image failed.
    #[error("fetch error: {0}")]
    Fetch(FetchError),

    /// Decoding and scoring did not finish in time.
    #[error("scoring timed out after {timeout_ms} ms")]
    ScoringTimeout {
        /// The configured deadline.
        timeout_ms: u64,
    },

    /// The ledger could not be read or written. The mutation was not
    /// committed.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// The ledger refused the event.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// A background task panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GateError {
    /// Short machine-readable name of the failure kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::FetchTimeout { .. } => "fetch_timeout",
            Self::Fetch(_) => "fetch",
            Self::ScoringTimeout { .. } => "scoring_timeout",
            Self::Persistence(_) => "persistence",
            Self::Ledger(_) => "ledger",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<FetchError> for GateError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Timeout {
                location,
                timeout_ms,
            } => Self::FetchTimeout {
                location,
                timeout_ms,
            },
            other => Self::Fetch(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn fetch_timeout_gets_its_own_kind() {
        let err = GateError::from(FetchError::Timeout {
            location: "https://x/y.png".to_owned(),
            timeout_ms: 15_000,
        });
        assert_eq!(err.kind(), "fetch_timeout");

        let err = GateError::from(FetchError::Io {
            path: PathBuf::from("missing.png"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert_eq!(err.kind(), "fetch");
    }

    #[test]
    fn decode_and_persistence_kinds() {
        assert_eq!(GateError::from(ScoringError::Empty).kind(), "decode");
        let store = StoreError::Unavailable("down".to_owned());
        assert_eq!(GateError::from(store).kind(), "persistence");
    }
}
