//! Fetching submission bytes from where they live.
//!
//! A submission arrives as a [`ImageSource`]: either a local path or an
//! `http(s)` URL. [`ImageFetcher`] reads the bytes under a single deadline
//! and rejects oversized payloads before buffering them in full where the
//! server tells us the length up front.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

/// Errors raised while fetching image bytes.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The fetch did not finish before the deadline.
    #[error("fetching {location} timed out after {timeout_ms} ms")]
    Timeout {
        /// The URL or path being fetched.
        location: String,
        /// The configured deadline.
        timeout_ms: u64,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The HTTP request failed before a response arrived.
    #[error("request to {url} failed: {source}")]
    Http {
        /// The requested URL.
        url: String,
        /// The underlying client error.
        source: reqwest::Error,
    },

    /// The local file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The payload is larger than the configured limit.
    #[error("{location} is {size} bytes, limit is {limit}")]
    TooLarge {
        /// The URL or path being fetched.
        location: String,
        /// Reported or observed size in bytes.
        size: u64,
        /// Configured maximum.
        limit: u64,
    },
}

/// Where a submission's image bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// An `http://` or `https://` URL.
    Url(String),
}

impl ImageSource {
    /// Classify a command-line or manifest value.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_owned())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// Reads image bytes from an [`ImageSource`] under a deadline.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: u64,
}

impl ImageFetcher {
    /// Create a fetcher with the given deadline and payload limit.
    pub fn new(timeout: Duration, max_bytes: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
            max_bytes: u64::try_from(max_bytes).unwrap_or(u64::MAX),
        }
    }

    /// The configured deadline.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch the bytes behind `source`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Timeout`] if the deadline passes, and the other
    /// [`FetchError`] variants for transport, status, and size failures.
    pub async fn fetch(&self, source: &ImageSource) -> Result<Vec<u8>, FetchError> {
        let work = async {
            match source {
                ImageSource::Url(url) => self.fetch_http(url).await,
                ImageSource::Path(path) => self.read_file(path).await,
            }
        };

        match tokio::time::timeout(self.timeout, work).await {
            Ok(result) => result,
            Err(_elapsed) => Err(FetchError::Timeout {
                location: source.to_string(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    async fn fetch_http(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        if let Some(length) = response.content_length() {
            self.check_size(url, length)?;
        }

        let body = response.bytes().await.map_err(|source| FetchError::Http {
            url: url.to_owned(),
            source,
        })?;
        self.check_size(url, u64::try_from(body.len()).unwrap_or(u64::MAX))?;

        debug!(url, bytes = body.len(), "fetched remote image");
        Ok(body.to_vec())
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, FetchError> {
        let io_err = |source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        };
        let metadata = tokio::fs::metadata(path).await.map_err(io_err)?;
        self.check_size(&path.display().to_string(), metadata.len())?;

        let bytes = tokio::fs::read(path).await.map_err(io_err)?;
        debug!(path = %path.display(), bytes = bytes.len(), "read local image");
        Ok(bytes)
    }

    fn check_size(&self, location: &str, size: u64) -> Result<(), FetchError> {
        if size > self.max_bytes {
            return Err(FetchError::TooLarge {
                location: location.to_owned(),
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn fetcher(max_bytes: usize) -> ImageFetcher {
        ImageFetcher::new(Duration::from_secs(5), max_bytes)
    }

    #[test]
    fn parse_classifies_urls_and_paths() {
        assert_eq!(
            ImageSource::parse("https://cdn.example.com/a.png"),
            ImageSource::Url("https://cdn.example.com/a.png".to_owned())
        );
        assert_eq!(
            ImageSource::parse(" HTTP://host/b.jpg "),
            ImageSource::Url("HTTP://host/b.jpg".to_owned())
        );
        assert_eq!(
            ImageSource::parse("photos/c.png"),
            ImageSource::Path(PathBuf::from("photos/c.png"))
        );
        assert_eq!(
            ImageSource::parse("ftp://host/d.png"),
            ImageSource::Path(PathBuf::from("ftp://host/d.png"))
        );
    }

    #[tokio::test]
    async fn reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.bin");
        std::fs::write(&path, [1_u8, 2, 3]).unwrap();

        let bytes = fetcher(1024).fetch(&ImageSource::Path(path)).await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = ImageSource::Path(dir.path().join("nope.png"));
        let err = fetcher(1024).fetch(&source).await.unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        std::fs::write(&path, vec![0_u8; 64]).unwrap();

        let err = fetcher(16).fetch(&ImageSource::Path(path)).await.unwrap_err();
        assert!(matches!(err, FetchError::TooLarge { size: 64, limit: 16, .. }));
    }
}
