//! Reference MPL implementation.
//!
//! Slower but easier to follow than [`crate::recurrence`]: every context
//! keeps two explicit exponentially weighted counts, `(E0, E1)`, of the zeros
//! and ones that followed it. The logit is `theta * (E1 - E0)`, and both
//! counts are decayed and updated on every trial.
//!
//! This module exists to be a test oracle. It shares no state machinery with
//! the optimized engine so that a mistake in one cannot hide in the other.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::iter::FusedIterator;

use crate::constants::LOGIT_CLAMP;
use crate::math;
use crate::types::MplParams;

/// Lazy probability stream of the two-count MPL form.
#[derive(Debug, Clone)]
pub struct ReferenceProbabilities<'a> {
    outcomes: &'a [u8],
    t: usize,
    params: MplParams,
    /// `(E0, E1)` per context.
    counts: Vec<(f64, f64)>,
    /// Last k outcomes as an integer, reduced modulo the number of contexts.
    eta: usize,
}

impl Iterator for ReferenceProbabilities<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let x = usize::from(*self.outcomes.get(self.t)?);
        let t = self.t;
        self.t += 1;

        let MplParams { k, a, rho, theta } = self.params;

        if t < k {
            self.eta = (self.eta << 1) + x;
            return Some(0.5);
        }

        let (e0, e1) = self.counts[self.eta];
        let f = theta * (e1 - e0);
        let p = if f > LOGIT_CLAMP {
            1.0
        } else if f < -LOGIT_CLAMP {
            0.0
        } else {
            let m = math::exp(f);
            m / (m + 1.0)
        };

        for (c0, c1) in self.counts.iter_mut() {
            *c0 *= a;
            *c1 *= a;
        }
        let (e0, e1) = self.counts[self.eta];
        self.counts[self.eta] = (
            rho * e0 + if x == 0 { 1.0 } else { 0.0 },
            rho * e1 + if x == 1 { 1.0 } else { 0.0 },
        );
        if k > 0 {
            self.eta = ((self.eta << 1) + x) % self.counts.len();
        }
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.outcomes.len() - self.t;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ReferenceProbabilities<'_> {}
impl FusedIterator for ReferenceProbabilities<'_> {}

/// Probability stream of the two-count MPL form over `outcomes`.
///
/// Logits above [`LOGIT_CLAMP`] yield exactly 1 and logits below
/// `-LOGIT_CLAMP` yield exactly 0.
pub fn mpl_reference<'a>(outcomes: &'a [u8], params: &MplParams) -> ReferenceProbabilities<'a> {
    ReferenceProbabilities {
        outcomes,
        t: 0,
        params: *params,
        counts: vec![(0.0, 0.0); 1 << params.k],
        eta: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::mpl;

    #[test]
    fn test_reference_zero_theta() {
        let params = MplParams::new(0, 1.0, 1.0, 0.0);
        let probs: Vec<f64> = mpl_reference(&[1, 0, 1, 0], &params).collect();
        assert_eq!(probs, vec![0.5; 4]);
    }

    #[test]
    fn test_reference_upper_clamp() {
        let params = MplParams::new(0, 0.0, 1.0, 1e7);
        let probs: Vec<f64> = mpl_reference(&[1, 1, 1], &params).collect();
        assert_eq!(probs, vec![0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_reference_lower_clamp_is_exact_zero() {
        let params = MplParams::new(0, 1.0, 1.0, 50.0);
        let slow: Vec<f64> = mpl_reference(&[0, 0, 0], &params).collect();
        assert_eq!(slow, vec![0.5, 0.0, 0.0]);

        // The optimized form has no lower clamp but agrees to within tolerance.
        let fast: Vec<f64> = mpl(&[0, 0, 0], &params).collect();
        for (s, f) in slow.iter().zip(&fast) {
            assert!((s - f).abs() < 1e-10);
        }
        assert!(fast[1] > 0.0);
    }

    #[test]
    fn test_reference_warm_up() {
        let params = MplParams::new(3, 0.5, 0.5, 2.0);
        let probs: Vec<f64> = mpl_reference(&[1, 0, 1, 1, 0], &params).collect();
        assert_eq!(&probs[..3], &[0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_reference_counts_by_hand() {
        // k = 0, A = 1, rho = 1: E1 - E0 is the running (#ones - #zeros).
        let params = MplParams::new(0, 1.0, 1.0, 1.0);
        let probs: Vec<f64> = mpl_reference(&[1, 1, 0], &params).collect();
        let expit = |f: f64| f.exp() / (1.0 + f.exp());
        assert_eq!(probs[0], 0.5);
        assert!((probs[1] - expit(1.0)).abs() < 1e-15);
        assert!((probs[2] - expit(2.0)).abs() < 1e-15);
    }
}
