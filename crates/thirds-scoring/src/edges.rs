//! Edge detection.
//!
//! A 3x3 high-pass kernel applied to the luminance channel:
//!
//! ```text
//! -1 -1 -1
//! -1  8 -1
//! -1 -1 -1
//! ```
//!
//! Responses are clamped to `0..=255`. The kernel sums to zero, so flat
//! regions produce no energy. Border pixels have no full neighbourhood and
//! are left at zero.

use image::GrayImage;

/// Weight of the centre pixel. The eight neighbours each weigh `-1`.
const CENTRE_WEIGHT: i32 = 8;

/// Apply the edge kernel to a grayscale image.
///
/// The output has the same dimensions as the input. Images narrower or
/// shorter than three pixels have no interior and yield an all-zero map.
pub fn edge_map(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut out = GrayImage::new(width, height);
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            out.put_pixel(x, y, image::Luma([response(gray, x, y)]));
        }
    }
    out
}

/// Kernel response at an interior pixel.
fn response(gray: &GrayImage, x: u32, y: u32) -> u8 {
    let luma = |px: u32, py: u32| i32::from(gray.get_pixel(px, py).0[0]);

    let (left, right) = (x.saturating_sub(1), x.saturating_add(1));
    let (up, down) = (y.saturating_sub(1), y.saturating_add(1));

    let ring: i32 = [
        luma(left, up),
        luma(x, up),
        luma(right, up),
        luma(left, y),
        luma(right, y),
        luma(left, down),
        luma(x, down),
        luma(right, down),
    ]
    .iter()
    .sum();

    let value = luma(x, y).saturating_mul(CENTRE_WEIGHT).saturating_sub(ring);
    u8::try_from(value.clamp(0, i32::from(u8::MAX))).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;

    fn value(img: &GrayImage, x: u32, y: u32) -> u8 {
        img.get_pixel(x, y).0[0]
    }

    #[test]
    fn flat_image_has_no_edges() {
        let gray = GrayImage::from_pixel(16, 9, Luma([180]));
        let edges = edge_map(&gray);
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn isolated_dot_lights_only_its_own_pixel() {
        let mut gray = GrayImage::new(5, 5);
        gray.put_pixel(2, 2, Luma([255]));
        let edges = edge_map(&gray);

        assert_eq!(value(&edges, 2, 2), 255);
        // Neighbours see a negative response, clamped to zero.
        assert_eq!(value(&edges, 1, 1), 0);
        assert_eq!(value(&edges, 3, 2), 0);
    }

    #[test]
    fn vertical_step_marks_the_bright_side() {
        let mut gray = GrayImage::new(6, 4);
        for y in 0..4 {
            for x in 3..6 {
                gray.put_pixel(x, y, Luma([100]));
            }
        }
        let edges = edge_map(&gray);

        // Bright column next to the step: 8*100 - (3*100 + 2*100) = 300 -> 255.
        assert_eq!(value(&edges, 3, 1), 255);
        // Dark column next to the step: 0 - 300 -> 0.
        assert_eq!(value(&edges, 2, 1), 0);
        // Interior of the bright region is flat.
        assert_eq!(value(&edges, 4, 1), 0);
    }

    #[test]
    fn border_is_never_lit() {
        let mut gray = GrayImage::new(4, 4);
        gray.put_pixel(0, 0, Luma([255]));
        gray.put_pixel(3, 3, Luma([255]));
        let edges = edge_map(&gray);
        assert_eq!(value(&edges, 0, 0), 0);
        assert_eq!(value(&edges, 3, 3), 0);
    }

    #[test]
    fn tiny_images_yield_empty_maps() {
        let gray = GrayImage::from_pixel(2, 8, Luma([255]));
        let edges = edge_map(&gray);
        assert_eq!(edges.dimensions(), (2, 8));
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }
}
