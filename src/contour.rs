//! Contour level selection.
//!
//! Levels are spaced evenly from a survey-specific floor up to (but never
//! reaching) the band maximum. A band that never rises above its floor gets
//! no contours at all.

use ndarray::ArrayView2;

use crate::band;

/// Number of contour levels drawn for every band unless configured otherwise
pub const DEFAULT_LEVEL_COUNT: usize = 4;

/// `count` thresholds `floor + k * (max - floor) / count` for `k` in `0..count`,
/// or `None` when the band maximum does not exceed `floor`.
pub fn levels(input: ArrayView2<f64>, floor: f64, count: usize) -> Option<Vec<f64>> {
    let peak = band::max(input);
    if !(peak > floor) || count == 0 {
        return None;
    }

    let step = (peak - floor) / count as f64;
    Some((0..count).map(|k| floor + k as f64 * step).collect())
}

/// Round every level to `decimals` places for display
pub fn round_levels(levels: &[f64], decimals: i32) -> Vec<f64> {
    let scale = 10f64.powi(decimals);
    levels.iter().map(|v| (v * scale).round() / scale).collect()
}
