//! Test data generators for synthetic georeferenced rasters.
//!
//! These generators create predictable, verifiable pixel patterns so a test
//! can tell from a sampled value exactly which pixel was read.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};

/// The RGBA value stored at `(row, col)` by [`create_test_png`].
///
/// Red carries the column, green the row (both modulo 256), blue and alpha
/// are constant. Reading a pixel back therefore identifies its position.
///
/// # Example
///
/// ```
/// use test_utils::pixel_pattern;
///
/// assert_eq!(pixel_pattern(1, 3), [3, 1, 0x80, 0xff]);
/// ```
pub fn pixel_pattern(row: u32, col: u32) -> [u8; 4] {
    [(col % 256) as u8, (row % 256) as u8, 0x80, 0xff]
}

/// The gray value stored at `(row, col)` by [`create_gray_png`].
pub fn gray_pattern(row: u32, col: u32, width: u32) -> u8 {
    ((row * width + col) % 256) as u8
}

/// Creates RGBA pixel data following [`pixel_pattern`], row-major.
pub fn create_test_rgba_pixels(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for row in 0..height {
        for col in 0..width {
            pixels.extend_from_slice(&pixel_pattern(row, col));
        }
    }
    pixels
}

/// Creates an encoded RGBA PNG following [`pixel_pattern`].
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(
        &create_test_rgba_pixels(width, height),
        width,
        height,
        ColorType::Rgba8,
    )
}

/// Creates an encoded single-channel PNG following [`gray_pattern`].
pub fn create_gray_png(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for row in 0..height {
        for col in 0..width {
            pixels.push(gray_pattern(row, col, width));
        }
    }
    encode_png(&pixels, width, height, ColorType::L8)
}

/// Creates an encoded RGB PNG (no alpha) following [`pixel_pattern`].
pub fn create_rgb_png(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for row in 0..height {
        for col in 0..width {
            pixels.extend_from_slice(&pixel_pattern(row, col)[..3]);
        }
    }
    encode_png(&pixels, width, height, ColorType::Rgb8)
}

/// Creates the text of a north-up world file.
///
/// Lines are: pixel size, two zero rotation terms, negative row size,
/// origin longitude, origin latitude.
///
/// # Example
///
/// ```
/// use test_utils::create_world_file;
///
/// let text = create_world_file(10.0, 50.0, 1.0);
/// assert_eq!(text.lines().count(), 6);
/// ```
pub fn create_world_file(origin_lng: f64, origin_lat: f64, pixel_size: f64) -> String {
    format!(
        "{}\n0.0\n0.0\n{}\n{}\n{}\n",
        pixel_size, -pixel_size, origin_lng, origin_lat
    )
}

fn encode_png(pixels: &[u8], width: u32, height: u32, color: ColorType) -> Vec<u8> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(pixels, width, height, color)
        .expect("Failed to encode generated PNG");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_pixels_layout() {
        let pixels = create_test_rgba_pixels(3, 2);
        assert_eq!(pixels.len(), 3 * 2 * 4);
        // row 1, col 2
        let start = (3 + 2) * 4;
        assert_eq!(&pixels[start..start + 4], &pixel_pattern(1, 2));
    }

    #[test]
    fn test_png_decodes_to_pattern() {
        let png = create_test_png(4, 3);
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();

        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 3);
        assert_eq!(decoded.get_pixel(3, 2).0, pixel_pattern(2, 3));
    }

    #[test]
    fn test_gray_png_is_single_channel() {
        let png = create_gray_png(5, 5);
        let decoded = image::load_from_memory(&png).unwrap();

        assert_eq!(decoded.color().channel_count(), 1);
        assert_eq!(decoded.to_luma8().get_pixel(2, 1).0, [gray_pattern(1, 2, 5)]);
    }

    #[test]
    fn test_world_file_lines() {
        let text = create_world_file(-10.5, 60.0, 0.25);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["0.25", "0.0", "0.0", "-0.25", "-10.5", "60"]);
    }
}
