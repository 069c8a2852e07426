//! Quantile computation using Type 7 quantiles (linear interpolation).
//!
//! **Type 7 formula** (for sorted sample x of size n at probability p):
//! ```text
//! h = (n - 1) * p
//! q = x[floor(h)] + (h - floor(h)) * (x[ceil(h)] - x[floor(h)])
//! ```
//!
//! This is the default estimator of R, NumPy and pandas, which keeps the
//! reported 2.5% and 97.5% posterior quantiles comparable with the usual
//! tooling.
//!
//! # Input Requirements
//!
//! All input data must be finite. In debug builds this is checked via
//! assertions.
//!
//! # Reference
//!
//! Hyndman, R. J. & Fan, Y. (1996). "Sample quantiles in statistical packages."
//! The American Statistician 50(4):361–365.

use crate::math;

/// 0-based floor and ceil indices plus the interpolation fraction.
#[inline]
fn interpolation_indices(n: usize, p: f64) -> (usize, usize, f64) {
    debug_assert!(n > 0, "n must be positive");
    let h = (n - 1) as f64 * p;
    let lo = (math::floor(h) as usize).min(n - 1);
    let hi = (math::ceil(h) as usize).min(n - 1);
    (lo, hi, h - lo as f64)
}

#[inline]
fn debug_assert_finite(data: &[f64]) {
    debug_assert!(
        data.iter().all(|x| x.is_finite()),
        "quantile input must be finite (no NaN or infinity)"
    );
}

#[inline]
fn check_probability(p: f64) {
    assert!(
        (0.0..=1.0).contains(&p),
        "Quantile probability must be in [0, 1]"
    );
}

/// Compute a single Type 7 quantile from a mutable slice.
///
/// Uses `select_nth_unstable_by()` for O(n) expected time complexity.
/// The slice is partially reordered as a side effect.
///
/// # Panics
///
/// Panics if `data` is empty or if `p` is outside [0, 1].
pub fn quantile(data: &mut [f64], p: f64) -> f64 {
    assert!(!data.is_empty(), "Cannot compute quantile of empty slice");
    check_probability(p);
    debug_assert_finite(data);

    let n = data.len();
    if n == 1 {
        return data[0];
    }

    let (lo, hi, frac) = interpolation_indices(n, p);
    let cmp = |a: &f64, b: &f64| a.total_cmp(b);

    let (_, mid, _) = data.select_nth_unstable_by(hi, cmp);
    let hi_val = *mid;
    if lo == hi {
        return hi_val;
    }

    // Everything left of `hi` is now <= hi_val, so the floor lives there.
    let (_, mid, _) = data[..hi].select_nth_unstable_by(lo, cmp);
    let lo_val = *mid;

    lo_val + frac * (hi_val - lo_val)
}

/// Type 7 quantile of already-sorted data.
///
/// # Panics
///
/// Panics if `sorted` is empty or if `p` is outside [0, 1].
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!(!sorted.is_empty(), "Cannot compute quantile of empty slice");
    check_probability(p);
    debug_assert!(
        sorted.windows(2).all(|w| w[0] <= w[1]),
        "quantile_sorted input must be sorted"
    );

    let (lo, hi, frac) = interpolation_indices(sorted.len(), p);
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_element() {
        assert_eq!(quantile(&mut [42.0], 0.5), 42.0);
        assert_eq!(quantile_sorted(&[42.0], 0.975), 42.0);
    }

    #[test]
    fn test_interpolation() {
        // 1..=10: h = 9 * 0.25 = 2.25 -> 3 + 0.25 * (4 - 3)
        let mut data: Vec<f64> = (1..=10).rev().map(f64::from).collect();
        assert!((quantile(&mut data, 0.25) - 3.25).abs() < 1e-12);
        assert_eq!(quantile(&mut data, 0.0), 1.0);
        assert_eq!(quantile(&mut data, 1.0), 10.0);
        assert!((quantile(&mut data, 0.5) - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_matches_numpy_default() {
        // numpy.quantile([1, 2, 3, 4, 5, 6, 7, 8, 9, 10], [0.025, 0.975])
        let sorted: Vec<f64> = (1..=10).map(f64::from).collect();
        assert!((quantile_sorted(&sorted, 0.025) - 1.225).abs() < 1e-12);
        assert!((quantile_sorted(&sorted, 0.975) - 9.775).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "empty slice")]
    fn test_empty_panics() {
        let _ = quantile(&mut [], 0.5);
    }

    #[test]
    #[should_panic(expected = "must be in [0, 1]")]
    fn test_bad_probability_panics() {
        let _ = quantile_sorted(&[1.0, 2.0], 1.5);
    }
}
