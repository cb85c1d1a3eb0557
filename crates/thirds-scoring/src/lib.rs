//! Rule-of-thirds composition scoring.
//!
//! Converts raw image bytes into a deterministic score in `[0, 10]` that
//! measures how close the image's edge-energy centroid sits to the nearest
//! rule-of-thirds intersection.
//!
//! # Pipeline
//!
//! ```text
//! bytes --> ImageDecoder --> grayscale --> edge map --> centroid --> score
//! ```
//!
//! - [`decode`] -- The decoding boundary: size guards and format sniffing.
//! - [`edges`] -- The 3x3 edge-detection filter producing the energy map.
//! - [`composition`] -- Centroid computation and the proximity score.
//!
//! Everything past decoding is pure. The same pixels always produce the
//! same score; nothing here touches the filesystem or the network.
//!
//! # Usage
//!
//! ```
//! use image::{GrayImage, Luma};
//! use thirds_scoring::composition::score_gray;
//!
//! // A single bright dot on a rule-of-thirds intersection.
//! let mut img = GrayImage::new(30, 30);
//! img.put_pixel(10, 10, Luma([255]));
//! let report = score_gray(&img);
//! assert!((report.score - 10.0).abs() < 1e-9);
//! ```

pub mod composition;
pub mod decode;
pub mod edges;

pub use composition::{
    Centroid, CompositionReport, NEUTRAL_SCORE, composition_score, score_gray,
    thirds_intersections,
};
pub use decode::{DEFAULT_MAX_IMAGE_BYTES, ImageDecoder};
pub use edges::edge_map;

/// Errors produced while turning bytes into a score.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// The byte buffer was empty.
    #[error("image payload is empty")]
    Empty,

    /// The byte buffer exceeded the configured size limit.
    #[error("image payload is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Size of the rejected payload.
        size: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// The bytes were not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decode `bytes` and score them in one step.
///
/// Convenience wrapper over [`ImageDecoder::decode`] and
/// [`composition::score_image`].
pub fn score_bytes(
    decoder: &ImageDecoder,
    bytes: &[u8],
) -> Result<CompositionReport, ScoringError> {
    let image = decoder.decode(bytes)?;
    Ok(composition::score_image(&image))
}
