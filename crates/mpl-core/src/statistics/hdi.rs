//! Highest-density interval of an empirical sample.
//!
//! The HDI is estimated as the shortest credible interval: sort the samples,
//! slide a window holding `c = ceil(m * n)` consecutive order statistics, and
//! keep the narrowest window. Ties go to the earliest (leftmost) window.
//!
//! # Reference
//!
//! Kruschke, J. K. (2015). "Doing Bayesian Data Analysis", 2nd ed., §25.2.

extern crate alloc;

use alloc::vec::Vec;

use crate::math;

/// Number of samples each candidate window must hold.
#[inline]
fn window_len(n: usize, credible_mass: f64) -> usize {
    // Guard against m*n landing a hair above an integer through rounding.
    let c = math::ceil(credible_mass * n as f64 - 1e-9) as usize;
    c.clamp(1, n)
}

/// Highest-density interval `(lower, upper)` of `samples`.
///
/// The input order does not matter; the samples are copied and sorted.
///
/// # Arguments
///
/// * `samples` - Representative values from a distribution
/// * `credible_mass` - Share of samples the interval must hold, in (0, 1)
///
/// # Panics
///
/// Panics if `samples` is empty or `credible_mass` is outside (0, 1).
pub fn hdi(samples: &[f64], credible_mass: f64) -> (f64, f64) {
    assert!(!samples.is_empty(), "Cannot compute HDI of empty slice");
    debug_assert!(
        samples.iter().all(|x| x.is_finite()),
        "HDI input must be finite (no NaN or infinity)"
    );

    let mut sorted: Vec<f64> = samples.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    hdi_sorted(&sorted, credible_mass)
}

/// Highest-density interval of already-sorted samples.
///
/// # Panics
///
/// Panics if `sorted` is empty or `credible_mass` is outside (0, 1).
pub fn hdi_sorted(sorted: &[f64], credible_mass: f64) -> (f64, f64) {
    assert!(!sorted.is_empty(), "Cannot compute HDI of empty slice");
    assert!(
        credible_mass > 0.0 && credible_mass < 1.0,
        "credible mass must be in (0, 1)"
    );
    debug_assert!(
        sorted.windows(2).all(|w| w[0] <= w[1]),
        "hdi_sorted input must be sorted"
    );

    let n = sorted.len();
    let c = window_len(n, credible_mass);

    let mut best = 0;
    let mut best_width = f64::INFINITY;
    for i in 0..=(n - c) {
        let width = sorted[i + c - 1] - sorted[i];
        // Strict comparison keeps the earliest window on ties.
        if width < best_width {
            best_width = width;
            best = i;
        }
    }
    (sorted[best], sorted[best + c - 1])
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn data_strategy(min_size: usize, max_size: usize) -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(-1e6..1e6f64, min_size..=max_size)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// No other window with the same number of samples is narrower.
        #[test]
        fn prop_hdi_is_minimal(data in data_strategy(1, 400), mass in 0.05..0.99f64) {
            let (lo, hi) = hdi(&data, mass);
            let mut sorted = data.clone();
            sorted.sort_unstable_by(|a, b| a.total_cmp(b));
            let c = window_len(sorted.len(), mass);
            for i in 0..=(sorted.len() - c) {
                prop_assert!(hi - lo <= sorted[i + c - 1] - sorted[i]);
            }
        }

        /// The interval holds at least ceil(m * n) samples.
        #[test]
        fn prop_hdi_holds_mass(data in data_strategy(1, 400), mass in 0.05..0.99f64) {
            let (lo, hi) = hdi(&data, mass);
            let inside = data.iter().filter(|&&x| x >= lo && x <= hi).count();
            let needed = (mass * data.len() as f64 - 1e-9).ceil() as usize;
            prop_assert!(inside >= needed.max(1));
        }

        /// Bounds are sample values and ordered.
        #[test]
        fn prop_hdi_bounds_are_samples(data in data_strategy(1, 200), mass in 0.05..0.99f64) {
            let (lo, hi) = hdi(&data, mass);
            prop_assert!(lo <= hi);
            prop_assert!(data.contains(&lo));
            prop_assert!(data.contains(&hi));
        }
    }
}
