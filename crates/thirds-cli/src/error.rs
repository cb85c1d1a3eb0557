//! Error types for the `thirds` binary.

use std::path::PathBuf;

/// Top-level error for the `thirds` binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: thirds_core::ConfigError,
    },

    /// A gate operation failed.
    #[error("{source} [{}]", .source.kind())]
    Gate {
        /// The underlying gate error.
        #[from]
        source: thirds_core::GateError,
    },

    /// The batch manifest could not be read.
    #[error("failed to read manifest {path}: {source}")]
    ManifestIo {
        /// The manifest path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A manifest line is not a valid entry.
    #[error("manifest line {line}: {source}")]
    ManifestLine {
        /// 1-based line number.
        line: usize,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// Some batch entries failed.
    #[error("{failed} of {total} submissions failed")]
    BatchFailures {
        /// Number of failed entries.
        failed: usize,
        /// Number of entries in the manifest.
        total: usize,
    },
}
