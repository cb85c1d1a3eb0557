//! Centroid proximity scoring.
//!
//! The edge map is treated as a mass distribution over pixel coordinates.
//! Its centroid is compared to the four rule-of-thirds intersections; the
//! closer it sits to the nearest one, the higher the score.
//!
//! ```text
//! dmin  = min distance(centroid, intersection)
//! maxd  = hypot(w / 3, h / 3)
//! score = (1 - min(dmin / maxd, 1)) * 10
//! ```
//!
//! An image with no edge energy at all has nothing to judge and gets
//! [`NEUTRAL_SCORE`].

use image::{DynamicImage, GrayImage};
use tracing::debug;

use crate::edges::edge_map;

/// Score returned when the edge map is entirely dark.
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Upper end of the score range.
const SCALE: f64 = 10.0;

/// Full-scale edge response; energies are normalized by this value.
const MAX_INTENSITY: f64 = 255.0;

/// Energy-weighted mean position of the edge map, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    /// Weighted mean column.
    pub x: f64,
    /// Weighted mean row.
    pub y: f64,
}

/// Everything the scorer worked out for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionReport {
    /// Final score in `[0, 10]`.
    pub score: f64,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Sum of normalized edge energy.
    pub total_energy: f64,
    /// Edge-energy centroid, `None` when `total_energy` is zero.
    pub centroid: Option<Centroid>,
    /// Distance from the centroid to the nearest intersection.
    pub nearest_distance: Option<f64>,
}

/// The four rule-of-thirds intersections for a `width` x `height` frame.
pub fn thirds_intersections(width: u32, height: u32) -> [(f64, f64); 4] {
    let (w, h) = (f64::from(width), f64::from(height));
    let (x1, x2) = (w / 3.0, 2.0 * w / 3.0);
    let (y1, y2) = (h / 3.0, 2.0 * h / 3.0);
    [(x1, y1), (x1, y2), (x2, y1), (x2, y2)]
}

/// Score a decoded image of any color type.
pub fn score_image(image: &DynamicImage) -> CompositionReport {
    score_gray(&image.to_luma8())
}

/// Score a decoded image, returning only the number.
pub fn composition_score(image: &DynamicImage) -> f64 {
    score_image(image).score
}

/// Score a grayscale image.
pub fn score_gray(gray: &GrayImage) -> CompositionReport {
    let (width, height) = gray.dimensions();
    let edges = edge_map(gray);
    let (total_energy, centroid) = energy_centroid(&edges);

    let Some(centroid) = centroid else {
        debug!(width, height, "no edge energy, neutral score");
        return CompositionReport {
            score: NEUTRAL_SCORE,
            width,
            height,
            total_energy,
            centroid: None,
            nearest_distance: None,
        };
    };

    let nearest = thirds_intersections(width, height)
        .iter()
        .map(|&(px, py)| (centroid.x - px).hypot(centroid.y - py))
        .fold(f64::INFINITY, f64::min);

    let max_distance = (f64::from(width) / 3.0).hypot(f64::from(height) / 3.0);
    let ratio = (nearest / max_distance).min(1.0);
    let score = (1.0 - ratio) * SCALE;

    debug!(
        width,
        height,
        total_energy,
        cx = centroid.x,
        cy = centroid.y,
        nearest,
        score,
        "scored composition"
    );

    CompositionReport {
        score,
        width,
        height,
        total_energy,
        centroid: Some(centroid),
        nearest_distance: Some(nearest),
    }
}

/// Total normalized energy and its centroid (absent when the total is zero).
fn energy_centroid(edges: &GrayImage) -> (f64, Option<Centroid>) {
    let mut total = 0.0_f64;
    let mut sum_x = 0.0_f64;
    let mut sum_y = 0.0_f64;

    for (x, y, pixel) in edges.enumerate_pixels() {
        let raw = pixel.0[0];
        if raw == 0 {
            continue;
        }
        let energy = f64::from(raw) / MAX_INTENSITY;
        total += energy;
        sum_x += energy * f64::from(x);
        sum_y += energy * f64::from(y);
    }

    if total > 0.0 {
        let centroid = Centroid {
            x: sum_x / total,
            y: sum_y / total,
        };
        (total, Some(centroid))
    } else {
        (total, None)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp, clippy::unwrap_used)]

    use image::{Luma, Rgb, RgbImage};

    use super::*;

    const EPS: f64 = 1e-9;

    fn dot(width: u32, height: u32, x: u32, y: u32) -> GrayImage {
        let mut img = GrayImage::new(width, height);
        img.put_pixel(x, y, Luma([255]));
        img
    }

    #[test]
    fn blank_image_is_exactly_neutral() {
        let report = score_gray(&GrayImage::new(64, 48));
        assert_eq!(report.score, NEUTRAL_SCORE);
        assert!(report.centroid.is_none());
        assert_eq!(report.total_energy, 0.0);
    }

    #[test]
    fn flat_colour_is_exactly_neutral() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([90, 140, 200])));
        assert_eq!(composition_score(&img), NEUTRAL_SCORE);
    }

    #[test]
    fn degenerate_sizes_are_neutral() {
        assert_eq!(score_gray(&GrayImage::new(1, 1)).score, NEUTRAL_SCORE);
        assert_eq!(score_gray(&GrayImage::from_pixel(2, 2, Luma([255]))).score, NEUTRAL_SCORE);
    }

    #[test]
    fn centroid_on_intersection_scores_ten() {
        // 30x30: intersections at 10 and 20 on both axes.
        for (x, y) in [(10, 10), (10, 20), (20, 10), (20, 20)] {
            let report = score_gray(&dot(30, 30, x, y));
            assert_eq!(report.score, 10.0, "dot at ({x}, {y})");
            assert_eq!(report.nearest_distance, Some(0.0));
        }
    }

    #[test]
    fn centre_of_frame_scores_half() {
        // Centre (15, 15) is hypot(5, 5) from every intersection; maxd is hypot(10, 10).
        let report = score_gray(&dot(30, 30, 15, 15));
        assert!((report.score - 5.0).abs() < EPS, "got {}", report.score);
    }

    #[test]
    fn near_corner_scores_low() {
        // (1, 1) is hypot(9, 9) from (10, 10): ratio 0.9.
        let report = score_gray(&dot(30, 30, 1, 1));
        assert!((report.score - 1.0).abs() < EPS, "got {}", report.score);
    }

    #[test]
    fn score_decreases_with_distance() {
        let scores: Vec<f64> = (10..=15)
            .map(|x| score_gray(&dot(30, 30, x, 10)).score)
            .collect();
        assert!(scores.windows(2).all(|w| w[0] > w[1]), "{scores:?}");
    }

    #[test]
    fn score_stays_in_range_for_assorted_patterns() {
        let mut patterns = Vec::new();

        let mut checker = GrayImage::new(37, 23);
        for (x, y, p) in checker.enumerate_pixels_mut() {
            *p = Luma([if (x / 3 + y / 3) % 2 == 0 { 255 } else { 0 }]);
        }
        patterns.push(checker);

        let mut gradient = GrayImage::new(50, 20);
        for (x, _, p) in gradient.enumerate_pixels_mut() {
            *p = Luma([u8::try_from(x * 5).unwrap_or(u8::MAX)]);
        }
        patterns.push(gradient);

        let mut noise = GrayImage::new(41, 41);
        let mut state: u32 = 12_345;
        for p in noise.pixels_mut() {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            *p = Luma([u8::try_from(state >> 24).unwrap_or(0)]);
        }
        patterns.push(noise);

        patterns.push(dot(300, 3, 299, 1));

        for img in &patterns {
            let score = score_gray(img).score;
            assert!((0.0..=10.0).contains(&score), "score {score} out of range");
        }
    }

    #[test]
    fn identical_input_identical_output() {
        let mut img = GrayImage::new(64, 40);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = Luma([u8::try_from((x * 7 + y * 13) % 256).unwrap_or(0)]);
        }
        let a = score_gray(&img);
        let b = score_gray(&img);
        assert_eq!(a, b);
    }

    #[test]
    fn intersections_for_non_square_frame() {
        let pts = thirds_intersections(90, 60);
        assert_eq!(pts, [(30.0, 20.0), (30.0, 40.0), (60.0, 20.0), (60.0, 40.0)]);
    }
}
