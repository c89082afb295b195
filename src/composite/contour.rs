//! Contour-emphasis composite.

use ndarray::ArrayView2;
use tracing::debug;

use super::{compose, RgbRaster, Recipe};
use crate::band;
use crate::contour::levels;
use crate::error::Result;

/// Composite three raw bands and pick contour levels from a fourth.
///
/// Every channel is normalized, sqrt-scaled from `0.1 * stddev` to its
/// maximum (unless the normalized band touches zero at an extreme), capped at
/// 1 and quantized with `255.99`. Levels come from `contour_band` with
/// `floor` and `level_count`, and are `None` when that band never rises above
/// `floor`.
pub fn overlayc(
    red: ArrayView2<f64>,
    green: ArrayView2<f64>,
    blue: ArrayView2<f64>,
    contour_band: ArrayView2<f64>,
    level_count: usize,
    floor: f64,
) -> Result<(RgbRaster, Option<Vec<f64>>)> {
    band::ensure_same_shape(&[red.dim(), green.dim(), blue.dim(), contour_band.dim()])?;

    let raster = compose(Recipe::RorContour, red, green, blue)?;
    let lvl = levels(contour_band, floor, level_count);

    debug!(
        operation = "overlayc",
        rows = raster.height(),
        cols = raster.width(),
        levels = ?lvl,
        "Contour composite built"
    );

    Ok((raster, lvl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::Channel;
    use ndarray::Array2;

    fn gradient(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, n), |(r, c)| (r * n + c) as f64 + 1.0)
    }

    #[test]
    fn test_overlayc_shape_and_levels() {
        let g = gradient(6);
        let (raster, lvl) = overlayc(g.view(), g.view(), g.view(), g.view(), 4, 10.0).unwrap();

        assert_eq!(raster.dim(), (6, 6, 3));
        let lvl = lvl.unwrap();
        assert_eq!(lvl.len(), 4);
        assert_eq!(lvl[0], 10.0);
    }

    #[test]
    fn test_overlayc_brightest_pixel_saturates() {
        let g = gradient(6);
        let (raster, _) = overlayc(g.view(), g.view(), g.view(), g.view(), 4, 0.0).unwrap();
        for channel in Channel::ALL {
            assert_eq!(raster.channel(channel)[[5, 5]], 255);
            assert_eq!(raster.channel(channel)[[0, 0]], 0);
        }
    }

    #[test]
    fn test_overlayc_placeholders_have_no_contours() {
        let zero = Array2::<f64>::zeros((5, 5));
        let (raster, lvl) =
            overlayc(zero.view(), zero.view(), zero.view(), zero.view(), 4, 0.0015).unwrap();
        assert_eq!(raster.dim(), (5, 5, 3));
        assert!(raster.pixels().iter().all(|&v| v == 0));
        assert!(lvl.is_none());
    }

    #[test]
    fn test_overlayc_rejects_mismatched_contour_band() {
        let g = gradient(4);
        let c = gradient(5);
        assert!(overlayc(g.view(), g.view(), g.view(), c.view(), 4, 0.0).is_err());
    }
}
