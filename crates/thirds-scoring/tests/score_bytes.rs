//! End-to-end scoring from encoded bytes.
//!
//! Builds small synthetic photographs in memory, encodes them with the
//! `image` crate, and checks the scores that come back out.

#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use thirds_scoring::{ImageDecoder, NEUTRAL_SCORE, ScoringError, score_bytes};

fn encode(img: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, format)
        .unwrap();
    cursor.into_inner()
}

/// Dark frame with a filled white square centred at `(cx, cy)`.
fn square_at(width: u32, height: u32, cx: u32, cy: u32, half: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, Rgb([12, 12, 12]));
    for y in cy - half..=cy + half {
        for x in cx - half..=cx + half {
            img.put_pixel(x, y, Rgb([250, 250, 250]));
        }
    }
    img
}

#[test]
fn subject_on_thirds_beats_subject_in_corner() {
    let decoder = ImageDecoder::default();

    let on_thirds = encode(square_at(90, 60, 30, 20, 4), ImageFormat::Png);
    let in_corner = encode(square_at(90, 60, 6, 6, 4), ImageFormat::Png);

    let good = score_bytes(&decoder, &on_thirds).unwrap();
    let bad = score_bytes(&decoder, &in_corner).unwrap();

    assert!(good.score > 9.5, "on-thirds square scored {}", good.score);
    assert!(bad.score < good.score);
    assert!((0.0..=10.0).contains(&bad.score));
}

#[test]
fn symmetric_subject_scores_exactly_on_intersection() {
    // A symmetric square's edge ring has its centroid at the square's centre.
    let bytes = encode(square_at(90, 60, 60, 40, 5), ImageFormat::Png);
    let report = score_bytes(&ImageDecoder::default(), &bytes).unwrap();
    let centroid = report.centroid.unwrap();
    assert!((centroid.x - 60.0).abs() < 1e-9);
    assert!((centroid.y - 40.0).abs() < 1e-9);
    assert!((report.score - 10.0).abs() < 1e-9);
}

#[test]
fn blank_png_is_neutral() {
    let bytes = encode(RgbImage::from_pixel(64, 64, Rgb([0, 0, 0])), ImageFormat::Png);
    let report = score_bytes(&ImageDecoder::default(), &bytes).unwrap();
    assert_eq!(report.score, NEUTRAL_SCORE);
}

#[test]
fn jpeg_input_is_accepted() {
    let bytes = encode(square_at(120, 80, 40, 27, 6), ImageFormat::Jpeg);
    let report = score_bytes(&ImageDecoder::default(), &bytes).unwrap();
    assert!((0.0..=10.0).contains(&report.score));
    assert_eq!((report.width, report.height), (120, 80));
}

#[test]
fn truncated_png_is_a_decode_error() {
    let mut bytes = encode(square_at(40, 40, 13, 13, 3), ImageFormat::Png);
    bytes.truncate(bytes.len() / 2);
    let err = score_bytes(&ImageDecoder::default(), &bytes).unwrap_err();
    assert!(matches!(err, ScoringError::Decode(_)));
}
