//! Float assertions with readable failure messages.

/// Tolerance used when none is given
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// `actual` is within `epsilon` (default [`DEFAULT_EPSILON`]) of `expected`
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    assert!(
        (actual - expected).abs() <= eps,
        "{} differs from {} by more than {}",
        actual,
        expected,
        eps
    );
}

/// Element-wise [`assert_approx_eq`], e.g. for contour level lists
pub fn assert_array_approx_eq(actual: &[f64], expected: &[f64], epsilon: Option<f64>) {
    assert_eq!(actual.len(), expected.len(), "length of {:?} vs {:?}", actual, expected);
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    if let Some(i) = (0..actual.len()).find(|&i| (actual[i] - expected[i]).abs() > eps) {
        panic!(
            "element {} differs: {:?} vs {:?} (epsilon {})",
            i, actual, expected, eps
        );
    }
}

/// `min <= actual <= max`
pub fn assert_in_range(actual: f64, min: f64, max: f64) {
    assert!(
        (min..=max).contains(&actual),
        "{} is outside [{}, {}]",
        actual,
        min,
        max
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_within_tolerance() {
        assert_array_approx_eq(&[0.015, 0.11], &[0.0150001, 0.11], Some(1e-6));
        assert_in_range(0.0, 0.0, 1.0);
    }

    #[test]
    #[should_panic(expected = "element 1 differs")]
    fn test_level_mismatch_names_element() {
        assert_array_approx_eq(&[0.015, 0.2], &[0.015, 0.11], None);
    }
}
