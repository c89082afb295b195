//! Helpers shared by the scaling laws.

use ndarray::ArrayView2;

use crate::band;

/// Fill in unset bounds from the band itself
pub fn resolve_bounds(
    input: ArrayView2<f64>,
    scale_min: Option<f64>,
    scale_max: Option<f64>,
) -> (f64, f64) {
    let lo = scale_min.unwrap_or_else(|| band::min(input));
    let hi = scale_max.unwrap_or_else(|| band::max(input));
    (lo, hi)
}

/// Clip to `[lo, hi]`; when `lo > hi` every value becomes `hi`
pub fn clip(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// True when the bounds leave nothing to rescale into
pub fn is_degenerate(lo: f64, hi: f64) -> bool {
    !(hi - lo > 0.0) || !(hi - lo).is_finite()
}
