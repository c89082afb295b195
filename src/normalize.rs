//! Median-centering normalization applied before scaling.

use ndarray::{Array2, ArrayView2};

use crate::band;

/// Subtract the median, then divide by the original maximum.
///
/// A band whose maximum is exactly zero is only median-subtracted.
pub fn normalize(input: ArrayView2<f64>) -> Array2<f64> {
    let median = band::median(input);
    let peak = band::max(input);

    let centered = input.mapv(|v| v - median);
    if peak != 0.0 {
        centered.mapv_into(|v| v / peak)
    } else {
        centered
    }
}
