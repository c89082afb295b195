//! Image checks for testing.
//!
//! Helpers for verifying the PNG files and rasters the tool produces.

use image::{DynamicImage, GenericImageView, ImageError, ImageFormat};
use rgbmaker::RgbRaster;
use std::path::Path;

/// Load an image from a file
pub fn load_image(path: &Path) -> Result<DynamicImage, ImageError> {
    image::open(path)
}

/// Load an image from a byte array
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(bytes)
}

/// Detect image format from bytes
pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Check if an image has the expected dimensions
pub fn assert_image_dimensions(
    image: &DynamicImage,
    expected_width: u32,
    expected_height: u32,
) -> Result<(), String> {
    let (actual_width, actual_height) = image.dimensions();

    if actual_width != expected_width || actual_height != expected_height {
        return Err(format!(
            "Image dimensions differ: actual = {}x{}, expected = {}x{}",
            actual_width, actual_height, expected_width, expected_height
        ));
    }

    Ok(())
}

/// Check that a decoded image carries exactly the pixels of `raster`,
/// with the raster's first row at the bottom of the image
pub fn assert_matches_raster(image: &DynamicImage, raster: &RgbRaster) -> Result<(), String> {
    assert_image_dimensions(image, raster.width() as u32, raster.height() as u32)?;
    let rgb = image.to_rgb8();
    let height = raster.height();

    for ((row, col, c), &value) in raster.pixels().indexed_iter() {
        let y = (height - 1 - row) as u32;
        let actual = rgb.get_pixel(col as u32, y).0[c];
        if actual != value {
            return Err(format!(
                "Pixel ({}, {}) channel {} differs: image = {}, raster = {}",
                row, col, c, actual, value
            ));
        }
    }

    Ok(())
}
