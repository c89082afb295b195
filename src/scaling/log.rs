//! Logarithmic scaling.

use ndarray::{Array2, ArrayView2};
use tracing::warn;

use super::common::resolve_bounds;
use crate::error::{Result, RgbError};

/// Divisor applied to `log10` when none is given
pub const DEFAULT_LOG_FACTOR: f64 = 2.0;

fn map_log(input: ArrayView2<f64>, lo: f64, hi: f64, factor: f64, scale_inside: bool) -> Array2<f64> {
    input.mapv(|v| {
        if v < lo {
            0.0
        } else if v > hi {
            1.0
        } else if scale_inside {
            v.log10() / factor
        } else {
            v
        }
    })
}

/// Log scaling that reports failure instead of recovering from it.
///
/// Values below `scale_min` become 0, values above `scale_max` become 1 and
/// values in between become `log10(v) / factor`. Fails when an in-range value
/// is not positive or `factor` cannot divide.
pub fn try_log(
    input: ArrayView2<f64>,
    scale_min: Option<f64>,
    scale_max: Option<f64>,
    factor: f64,
) -> Result<Array2<f64>> {
    let (lo, hi) = resolve_bounds(input, scale_min, scale_max);

    if factor == 0.0 || !factor.is_finite() {
        return Err(RgbError::Scaling {
            law: "log".to_string(),
            message: format!("factor {} cannot divide", factor),
        });
    }

    let non_positive = input
        .iter()
        .filter(|&&v| v >= lo && v <= hi && v <= 0.0)
        .count();
    if non_positive > 0 {
        return Err(RgbError::Scaling {
            law: "log".to_string(),
            message: format!("{} in-range values are not positive", non_positive),
        });
    }

    Ok(map_log(input, lo, hi, factor, true))
}

/// Log scaling that never aborts.
///
/// On failure the warning is logged and the in-range region is left
/// unscaled, while the out-of-range pixels are still mapped to 0 and 1.
pub fn log(
    input: ArrayView2<f64>,
    scale_min: Option<f64>,
    scale_max: Option<f64>,
    factor: f64,
) -> Array2<f64> {
    match try_log(input, scale_min, scale_max, factor) {
        Ok(scaled) => scaled,
        Err(e) => {
            warn!(error = %e, "Error on log10, in-range values left unscaled");
            let (lo, hi) = resolve_bounds(input, scale_min, scale_max);
            map_log(input, lo, hi, factor, false)
        }
    }
}
