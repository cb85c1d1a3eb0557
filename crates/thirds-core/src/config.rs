//! Configuration loading and typed config structures.
//!
//! The configuration lives in `thirds.yaml` next to the ledger file by
//! default. Every field has a default, so a missing file or a file that sets
//! only a few keys is fine.
//!
//! ```yaml
//! storage:
//!   scores_file: scores.json
//! scoring:
//!   decode_timeout_ms: 10000
//!   fetch_timeout_ms: 15000
//!   max_image_bytes: 52428800
//! leaderboard:
//!   top_users: 5
//!   top_images: 3
//! logging:
//!   level: info
//!   format: pretty
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thirds_scoring::DEFAULT_MAX_IMAGE_BYTES;

/// Environment variable overriding [`StorageConfig::scores_file`].
pub const ENV_SCORES_FILE: &str = "THIRDS_SCORES_FILE";

/// Environment variable overriding [`LoggingConfig::level`].
pub const ENV_LOG_LEVEL: &str = "THIRDS_LOG_LEVEL";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ThirdsConfig {
    /// Where the ledger is persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Decoding and fetching limits.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Default leaderboard sizes.
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ThirdsConfig {
    /// Load configuration from a YAML file, falling back to defaults when
    /// the file does not exist. Environment overrides are applied either way.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let mut config = Self::default();
                config.apply_env_overrides();
                Ok(config)
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load configuration from a YAML file that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override file values with `THIRDS_*` environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(val) = get(ENV_SCORES_FILE) {
            self.storage.scores_file = PathBuf::from(val);
        }
        if let Some(val) = get(ENV_LOG_LEVEL) {
            self.logging.level = val;
        }
    }
}

/// Ledger storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON ledger file.
    #[serde(default = "default_scores_file")]
    pub scores_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scores_file: default_scores_file(),
        }
    }
}

/// Limits applied while turning a submission into pixels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoringConfig {
    /// Deadline for decoding and scoring one image, in milliseconds.
    #[serde(default = "default_decode_timeout_ms")]
    pub decode_timeout_ms: u64,

    /// Deadline for fetching a remote image, in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Largest accepted image payload, in bytes.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
}

impl ScoringConfig {
    /// [`Self::decode_timeout_ms`] as a [`Duration`].
    pub const fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms)
    }

    /// [`Self::fetch_timeout_ms`] as a [`Duration`].
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            decode_timeout_ms: default_decode_timeout_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

/// Default leaderboard sizes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaderboardConfig {
    /// Entries on the all-time and weekly user boards.
    #[serde(default = "default_top_users")]
    pub top_users: usize,

    /// Entries on the best-images board.
    #[serde(default = "default_top_images")]
    pub top_images: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            top_users: default_top_users(),
            top_images: default_top_images(),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_scores_file() -> PathBuf {
    PathBuf::from("scores.json")
}

const fn default_decode_timeout_ms() -> u64 {
    10_000
}

const fn default_fetch_timeout_ms() -> u64 {
    15_000
}

const fn default_max_image_bytes() -> usize {
    DEFAULT_MAX_IMAGE_BYTES
}

const fn default_top_users() -> usize {
    5
}

const fn default_top_images() -> usize {
    3
}

fn default_log_level() -> String {
    "info".to_owned()
}
