//! Square-root scaling.
//!
//! This is the workhorse law of every composite recipe: it lifts faint
//! structure without the blow-up `log` has near zero.

use ndarray::{Array2, ArrayView2};
use tracing::warn;

use super::common::{clip, is_degenerate, resolve_bounds};

/// Clip, subtract `scale_min`, take the square root and divide by
/// `sqrt(scale_max - scale_min)`.
///
/// An empty or inverted range maps every pixel to zero.
pub fn sqrt(input: ArrayView2<f64>, scale_min: Option<f64>, scale_max: Option<f64>) -> Array2<f64> {
    let (lo, hi) = resolve_bounds(input, scale_min, scale_max);
    if is_degenerate(lo, hi) {
        warn!(
            law = "sqrt",
            scale_min = lo,
            scale_max = hi,
            "Scaling range is empty, channel will be blank"
        );
        return Array2::zeros(input.dim());
    }

    let norm = (hi - lo).sqrt();
    input.mapv(|v| (clip(v, lo, hi) - lo).max(0.0).sqrt() / norm)
}
