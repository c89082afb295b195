//! Single-band images and the summary statistics the scalers rely on.
//!
//! A band is a plain `Array2<f64>` on the common pixel grid. Statistics follow
//! the conventions the compositing recipes were tuned against: population
//! standard deviation, even-count medians averaged, and percentiles linearly
//! interpolated over the sorted *unique* pixel values.

use ndarray::{Array2, ArrayView2};

use crate::error::{Result, RgbError};

/// One 2-D intensity image from a single survey
pub type Band = Array2<f64>;

/// Zero-filled stand-in for a band the archive could not deliver
pub fn placeholder(px: usize) -> Band {
    Array2::zeros((px, px))
}

/// Largest pixel value (`-inf` for an empty band)
pub fn max(band: ArrayView2<f64>) -> f64 {
    band.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Smallest pixel value (`+inf` for an empty band)
pub fn min(band: ArrayView2<f64>) -> f64 {
    band.iter().copied().fold(f64::INFINITY, f64::min)
}

fn sorted_values(band: ArrayView2<f64>) -> Vec<f64> {
    let mut values: Vec<f64> = band.iter().copied().collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values
}

/// Median of all pixel values
pub fn median(band: ArrayView2<f64>) -> f64 {
    let values = sorted_values(band);
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Population standard deviation of all pixel values
pub fn std_dev(band: ArrayView2<f64>) -> f64 {
    let n = band.len();
    if n == 0 {
        return f64::NAN;
    }
    let mean = band.iter().sum::<f64>() / n as f64;
    let var = band.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
    var.sqrt()
}

/// Percentile (0-100) of the distinct pixel values, linearly interpolated
pub fn percentile_of_unique(band: ArrayView2<f64>, pct: f64) -> f64 {
    let mut values = sorted_values(band);
    values.dedup();
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    values[lo] + (values[hi] - values[lo]) * frac
}

/// Human-readable value range, as reported for the radio bands
pub fn range_text(band: ArrayView2<f64>) -> String {
    format!(
        "value ranges from {:.4} to {:.4}",
        min(band),
        max(band)
    )
}

/// Ensure every `(rows, cols)` shape matches the first
pub fn ensure_same_shape(shapes: &[(usize, usize)]) -> Result<()> {
    let Some(&expected) = shapes.first() else {
        return Ok(());
    };
    for &found in &shapes[1..] {
        if found != expected {
            return Err(RgbError::ShapeMismatch { expected, found });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_median_odd_and_even() {
        let odd = array![[3.0, 1.0, 2.0]];
        assert_eq!(median(odd.view()), 2.0);

        let even = array![[4.0, 1.0], [3.0, 2.0]];
        assert_eq!(median(even.view()), 2.5);
    }

    #[test]
    fn test_std_dev_is_population() {
        let band = array![[2.0, 4.0], [4.0, 4.0], [5.0, 5.0], [7.0, 9.0]];
        assert!((std_dev(band.view()) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_ignores_duplicates() {
        // unique values are [0, 10]; duplicates must not pull the percentile down
        let band = array![[0.0, 0.0, 0.0, 10.0]];
        assert_eq!(percentile_of_unique(band.view(), 50.0), 5.0);
        assert_eq!(percentile_of_unique(band.view(), 100.0), 10.0);
        assert_eq!(percentile_of_unique(band.view(), 0.0), 0.0);
    }

    #[test]
    fn test_placeholder_shape() {
        let band = placeholder(8);
        assert_eq!(band.dim(), (8, 8));
        assert_eq!(max(band.view()), 0.0);
    }

    #[test]
    fn test_ensure_same_shape() {
        let a = placeholder(4);
        let b = placeholder(4);
        let c = Array2::<f64>::zeros((4, 5));
        assert!(ensure_same_shape(&[a.dim(), b.dim()]).is_ok());
        assert!(ensure_same_shape(&[]).is_ok());
        assert!(matches!(
            ensure_same_shape(&[a.dim(), b.dim(), c.dim()]),
            Err(RgbError::ShapeMismatch {
                expected: (4, 4),
                found: (4, 5)
            })
        ));
    }

    #[test]
    fn test_range_text() {
        let band = array![[-0.5, 1.25]];
        assert_eq!(range_text(band.view()), "value ranges from -0.5000 to 1.2500");
    }
}
