//! Linear scaling.

use ndarray::{Array2, ArrayView2};
use tracing::debug;

use super::common::{clip, is_degenerate, resolve_bounds};
use crate::band;

/// Clip to `[scale_min, scale_max]` and rescale linearly into `[0, 1]`.
///
/// A band whose maximum is exactly zero is returned as-is, even when that
/// leaves values outside `[0, 1]`.
pub fn linear(
    input: ArrayView2<f64>,
    scale_min: Option<f64>,
    scale_max: Option<f64>,
) -> Array2<f64> {
    if band::max(input) == 0.0 {
        debug!(law = "linear", "Band maximum is zero, leaving band unscaled");
        return input.to_owned();
    }

    let (lo, hi) = resolve_bounds(input, scale_min, scale_max);
    if is_degenerate(lo, hi) {
        debug!(law = "linear", lo = lo, hi = hi, "Empty scaling range");
        return Array2::zeros(input.dim());
    }

    let span = hi - lo;
    input.mapv(|v| ((clip(v, lo, hi) - lo) / span).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_rescales_and_clips() {
        let band = array![[-5.0, 0.0], [5.0, 20.0]];
        let out = linear(band.view(), Some(0.0), Some(10.0));
        assert_eq!(out, array![[0.0, 0.0], [0.5, 1.0]]);
    }

    #[test]
    fn test_linear_defaults_to_band_range() {
        let band = array![[2.0, 4.0, 6.0]];
        let out = linear(band.view(), None, None);
        assert_eq!(out, array![[0.0, 0.5, 1.0]]);
    }

    #[test]
    fn test_linear_zero_max_returns_input() {
        // Values stay outside [0, 1]; this guard is kept on purpose
        let band = array![[-4.0, -2.0], [0.0, -1.0]];
        let out = linear(band.view(), Some(-1.0), Some(0.0));
        assert_eq!(out, band);
    }
}
