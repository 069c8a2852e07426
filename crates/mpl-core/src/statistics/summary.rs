//! One-line posterior summary of a scalar quantity.

extern crate alloc;

use alloc::vec::Vec;

use super::{hdi_sorted, quantile_sorted};
use crate::math;

/// Mean, standard deviation, central 95% interval and HDI of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator; 0 for a single sample).
    pub sd: f64,
    /// 2.5% quantile.
    pub q025: f64,
    /// 97.5% quantile.
    pub q975: f64,
    /// Highest-density interval `(lower, upper)`.
    pub hdi: (f64, f64),
}

impl Summary {
    /// Summarize `samples`, with the HDI holding `credible_mass` of them.
    ///
    /// # Panics
    ///
    /// Panics if `samples` is empty or `credible_mass` is outside (0, 1).
    pub fn from_samples(samples: &[f64], credible_mass: f64) -> Self {
        assert!(!samples.is_empty(), "Cannot summarize empty slice");

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let sd = if samples.len() > 1 {
            let ss: f64 = samples.iter().map(|&x| math::sq(x - mean)).sum();
            math::sqrt(ss / (n - 1.0))
        } else {
            0.0
        };

        let mut sorted: Vec<f64> = samples.to_vec();
        sorted.sort_unstable_by(|a, b| a.total_cmp(b));

        Self {
            mean,
            sd,
            q025: quantile_sorted(&sorted, 0.025),
            q975: quantile_sorted(&sorted, 0.975),
            hdi: hdi_sorted(&sorted, credible_mass),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_summary() {
        let samples: Vec<f64> = (1..=100).map(f64::from).collect();
        let s = Summary::from_samples(&samples, 0.95);
        assert!((s.mean - 50.5).abs() < 1e-12);
        // sd of 1..=100 with n - 1 denominator
        assert!((s.sd - 29.011_491_975_882_016).abs() < 1e-9);
        assert!((s.q025 - 3.475).abs() < 1e-12);
        assert!((s.q975 - 97.525).abs() < 1e-12);
        assert_eq!(s.hdi, (1.0, 95.0));
    }

    #[test]
    fn test_single_sample() {
        let s = Summary::from_samples(&[2.5], 0.95);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.sd, 0.0);
        assert_eq!(s.hdi, (2.5, 2.5));
    }
}
