//! Service layer for the Thirds composition scorer.
//!
//! Ties scoring, the ledger, and persistence together behind the
//! [`SubmissionGate`], and carries the configuration and small utilities a
//! front end needs.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `thirds.yaml` into
//!   strongly-typed structs, with `THIRDS_*` environment overrides.
//! - [`clock`] -- [`Clock`], the source of "now" for event stamps and
//!   time-windowed queries.
//! - [`processed`] -- [`ProcessedSet`], the in-memory idempotence guard.
//! - [`fetch`] -- [`ImageFetcher`] and [`ImageSource`]: local files and
//!   `http(s)` URLs under a deadline.
//! - [`gate`] -- [`SubmissionGate`], the single writer of the ledger.
//! - [`prompts`] -- Daily photography themes.
//! - [`error`] -- [`GateError`], the failure kinds a caller can tell apart.

pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gate;
pub mod processed;
pub mod prompts;

pub use clock::{Clock, ManualClock};
pub use config::{ConfigError, LogFormat, ThirdsConfig};
pub use error::GateError;
pub use fetch::{FetchError, ImageFetcher, ImageSource};
pub use gate::{IngestOutcome, ResetOutcome, SharedGate, SkipReason, SubmissionGate};
pub use processed::ProcessedSet;
