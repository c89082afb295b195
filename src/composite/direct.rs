//! Direct composite for the IOU and optical recipes.

use ndarray::ArrayView2;
use tracing::debug;

use super::{compose, Algorithm, RgbRaster, Recipe};
use crate::error::{Result, RgbError};

/// Composite three raw bands with the per-channel scaling of `recipe`.
///
/// Only direct recipes (`IOU`, `Optical`) are accepted; each channel is
/// quantized on its own, so channels are not normalized against each other.
pub fn overlayo(
    red: ArrayView2<f64>,
    green: ArrayView2<f64>,
    blue: ArrayView2<f64>,
    recipe: Recipe,
) -> Result<RgbRaster> {
    if recipe.algorithm() != Algorithm::Direct {
        return Err(RgbError::InvalidParameter {
            param: "recipe".to_string(),
            message: format!("{} is not a direct composite recipe", recipe),
        });
    }

    let raster = compose(recipe, red, green, blue)?;

    debug!(
        operation = "overlayo",
        recipe = %recipe,
        rows = raster.height(),
        cols = raster.width(),
        "Direct composite built"
    );

    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::Channel;
    use ndarray::Array2;

    #[test]
    fn test_optical_unit_bands_are_uniform() {
        let ones = Array2::from_elem((8, 8), 1.0);
        let raster = overlayo(ones.view(), ones.view(), ones.view(), Recipe::Optical).unwrap();

        assert_eq!(raster.dim(), (8, 8, 3));
        for channel in Channel::ALL {
            let view = raster.channel(channel);
            let first = view[[0, 0]];
            assert!(view.iter().all(|&v| v == first));
        }
    }

    #[test]
    fn test_iou_red_and_green_reach_full_scale() {
        let band = Array2::from_shape_fn((10, 10), |(r, c)| (r * 10 + c) as f64 + 1.0);
        let raster = overlayo(band.view(), band.view(), band.view(), Recipe::Iou).unwrap();

        assert_eq!(raster.channel(Channel::Green)[[9, 9]], 255);
        assert!(raster.channel(Channel::Red)[[9, 9]] >= 254);
        assert_eq!(raster.channel(Channel::Red)[[0, 0]], 0);
    }

    #[test]
    fn test_iou_blue_is_log_scaled() {
        let band = Array2::from_shape_fn((10, 10), |(r, c)| (r * 10 + c) as f64 + 1.0);
        let raster = overlayo(band.view(), band.view(), band.view(), Recipe::Iou).unwrap();

        // 100 is the top percentile: log10(100) / 3.15 * 255
        assert_eq!(raster.channel(Channel::Blue)[[9, 9]], (2.0 / 3.15 * 255.0) as u8);
        // below the 5th percentile of unique values
        assert_eq!(raster.channel(Channel::Blue)[[0, 0]], 0);
    }

    #[test]
    fn test_overlayo_rejects_contour_recipe() {
        let ones = Array2::from_elem((2, 2), 1.0);
        let err = overlayo(ones.view(), ones.view(), ones.view(), Recipe::RorContour);
        assert!(matches!(err, Err(RgbError::InvalidParameter { .. })));
    }

    #[test]
    fn test_overlayo_over_placeholder() {
        let zero = Array2::<f64>::zeros((6, 6));
        let band = Array2::from_shape_fn((6, 6), |(r, c)| (r + c) as f64 + 1.0);
        let raster = overlayo(band.view(), zero.view(), band.view(), Recipe::Optical).unwrap();
        assert_eq!(raster.dim(), (6, 6, 3));
        assert!(raster.channel(Channel::Green).iter().all(|&v| v == 0));
    }
}
