//! The 8-bit raster handed to the renderer.

use image::{ImageBuffer, RgbImage};
use ndarray::{s, Array2, Array3, ArrayView2, Axis};
use std::io::Cursor;

use super::Channel;
use crate::error::{Result, RgbError};

/// Multiply and truncate into `u8`.
///
/// The cast saturates: negatives and NaN become 0, anything past 255 becomes 255.
pub fn quantize(channel: ArrayView2<f64>, multiplier: f64) -> Array2<u8> {
    channel.mapv(|v| (v * multiplier) as u8)
}

/// `height x width x 3` raster, row 0 being the bottom of the sky image
#[derive(Debug, Clone, PartialEq)]
pub struct RgbRaster {
    pixels: Array3<u8>,
}

impl RgbRaster {
    /// Stack three quantized channels pixel-last
    pub fn from_channels(red: &Array2<u8>, green: &Array2<u8>, blue: &Array2<u8>) -> Result<Self> {
        let expected = red.dim();
        for found in [green.dim(), blue.dim()] {
            if found != expected {
                return Err(RgbError::ShapeMismatch { expected, found });
            }
        }

        let pixels = ndarray::stack(Axis(2), &[red.view(), green.view(), blue.view()]).map_err(
            |e| RgbError::ImageGeneration {
                message: format!("Failed to stack channels: {}", e),
            },
        )?;
        Ok(Self { pixels })
    }

    /// Grey raster from a band already scaled into `[0, 1]`
    pub fn from_grey(scaled: ArrayView2<f64>) -> Self {
        let grey = quantize(scaled, 255.99);
        let pixels = ndarray::stack(Axis(2), &[grey.view(), grey.view(), grey.view()])
            .unwrap_or_else(|_| Array3::zeros((grey.nrows(), grey.ncols(), 3)));
        Self { pixels }
    }

    pub fn height(&self) -> usize {
        self.pixels.shape()[0]
    }

    pub fn width(&self) -> usize {
        self.pixels.shape()[1]
    }

    /// `(height, width, 3)`
    pub fn dim(&self) -> (usize, usize, usize) {
        self.pixels.dim()
    }

    pub fn pixels(&self) -> &Array3<u8> {
        &self.pixels
    }

    pub fn channel(&self, channel: Channel) -> ArrayView2<'_, u8> {
        self.pixels.slice(s![.., .., channel.index()])
    }

    /// Convert to an `image` buffer with north up
    pub fn to_rgb_image(&self) -> Result<RgbImage> {
        let (height, width, _) = self.dim();
        let mut img: RgbImage = ImageBuffer::new(width as u32, height as u32);

        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let row = height - 1 - y as usize;
            let col = x as usize;
            *pixel = image::Rgb([
                self.pixels[[row, col, 0]],
                self.pixels[[row, col, 1]],
                self.pixels[[row, col, 2]],
            ]);
        }

        Ok(img)
    }

    /// Encode as PNG bytes
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let img = self.to_rgb_image()?;
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, image::ImageFormat::Png)
            .map_err(|e| RgbError::ImageGeneration {
                message: format!("Failed to encode PNG: {}", e),
            })?;
        Ok(buffer.into_inner())
    }
}
