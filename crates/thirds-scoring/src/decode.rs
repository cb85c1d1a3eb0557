//! The decoding boundary.
//!
//! Raw bytes come from outside (an attachment download, a file on disk) and
//! may be anything. [`ImageDecoder`] rejects empty and oversized payloads
//! before handing the rest to the `image` crate, which sniffs the format
//! from the magic bytes.

use image::DynamicImage;
use tracing::debug;

use crate::ScoringError;

/// Default upper bound on an image payload (50 MiB).
///
/// Decoding cost scales with pixel count, so an unbounded payload is an easy
/// way to stall the scorer.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024;

/// Decodes raw bytes into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDecoder {
    max_bytes: usize,
}

impl ImageDecoder {
    /// Create a decoder that accepts payloads up to `max_bytes`.
    pub const fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// The configured payload limit.
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Decode `bytes` into an image.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::Empty`] or [`ScoringError::TooLarge`] when the
    /// payload fails the size guard, and [`ScoringError::Decode`] when the
    /// bytes are not a supported image format.
    pub fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, ScoringError> {
        if bytes.is_empty() {
            return Err(ScoringError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(ScoringError::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }

        let image = image::load_from_memory(bytes)?;
        debug!(
            width = image.width(),
            height = image.height(),
            color = ?image.color(),
            "decoded image"
        );
        Ok(image)
    }
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IMAGE_BYTES)
    }
}
