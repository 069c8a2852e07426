//! Optimized MPL recurrence.
//!
//! For each trial t the model predicts `P(choice_t = 1)` from the outcomes
//! observed before t. Memory is a bank of `2^k` real accumulators, one per
//! context (the last k outcomes). Each accumulator stands in for a pair of
//! exponentially weighted counts of 0s and 1s seen in that context; because
//! only their difference enters the logit, the pair folds into one number:
//!
//! ```text
//! f_t          = theta * mem[eta]
//! mem[i]      *= A                          (every slot)
//! mem[eta]     = rho * mem[eta] + (2x_t - 1)
//! eta          = ((eta << 1) | x_t) mod 2^k
//! ```
//!
//! With k = 0 there is a single slot that is always active, so the decay and
//! the recency weight fold further into `mem = rho*A*mem + (2x_t - 1)`.
//!
//! The first k trials emit exactly 0.5 while the context window fills.
//! See [`crate::reference`] for the unfolded two-count form this is checked
//! against.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::iter::FusedIterator;

use crate::math;
use crate::types::{ContextWindow, MplParams};

/// Map an observed bit to {-1, +1}.
#[inline]
fn centered(x: u8) -> f64 {
    2.0 * f64::from(x) - 1.0
}

/// Lazy stream of per-trial logits `f_t` (0 during warm-up).
///
/// Owns its memory bank; each call to [`mpl_logits`] starts from a fresh
/// state, so independent streams never share anything.
#[derive(Debug, Clone)]
pub struct Logits<'a> {
    outcomes: &'a [u8],
    t: usize,
    params: MplParams,
    eta: ContextWindow,
    memory: Vec<f64>,
}

impl<'a> Logits<'a> {
    fn new(outcomes: &'a [u8], params: &MplParams) -> Self {
        Self {
            outcomes,
            t: 0,
            params: *params,
            eta: ContextWindow::new(params.k),
            memory: vec![0.0; params.num_slots()],
        }
    }
}

impl Iterator for Logits<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let x = *self.outcomes.get(self.t)?;
        debug_assert!(x <= 1, "outcomes must be binary");
        let t = self.t;
        self.t += 1;

        let MplParams { k, a, rho, theta } = self.params;

        if k == 0 {
            let mem = &mut self.memory[0];
            let f = theta * *mem;
            *mem = rho * a * *mem + centered(x);
            return Some(f);
        }

        if t < k {
            self.eta.push(x);
            return Some(0.0);
        }

        let slot = self.eta.index();
        let f = theta * self.memory[slot];
        for m in self.memory.iter_mut() {
            *m *= a;
        }
        self.memory[slot] = rho * self.memory[slot] + centered(x);
        self.eta.push(x);
        Some(f)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.outcomes.len() - self.t;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Logits<'_> {}
impl FusedIterator for Logits<'_> {}

/// Lazy stream of per-trial probabilities of choosing option 1.
#[derive(Debug, Clone)]
pub struct Probabilities<'a> {
    logits: Logits<'a>,
}

impl Iterator for Probabilities<'_> {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        self.logits.next().map(math::logit_to_probability)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.logits.size_hint()
    }
}

impl ExactSizeIterator for Probabilities<'_> {}
impl FusedIterator for Probabilities<'_> {}

/// Logit stream of the MPL model over `outcomes`.
pub fn mpl_logits<'a>(outcomes: &'a [u8], params: &MplParams) -> Logits<'a> {
    Logits::new(outcomes, params)
}

/// Probability stream of the MPL model over `outcomes`.
///
/// Yields one value per outcome: `P(choice_t = 1 | outcomes[..t])`.
/// Logits above [`crate::LOGIT_CLAMP`] yield exactly 1.
///
/// # Example
///
/// ```
/// use mpl_core::{mpl, MplParams};
///
/// let params = MplParams::new(0, 1.0, 1.0, 0.0);
/// let probs: Vec<f64> = mpl(&[1, 0, 1, 0], &params).collect();
/// assert_eq!(probs, vec![0.5; 4]);
/// ```
pub fn mpl<'a>(outcomes: &'a [u8], params: &MplParams) -> Probabilities<'a> {
    Probabilities {
        logits: Logits::new(outcomes, params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::KMAX;

    #[test]
    fn test_zero_theta_is_uninformative() {
        let params = MplParams::new(0, 1.0, 1.0, 0.0);
        let probs: Vec<f64> = mpl(&[1, 0, 1, 0], &params).collect();
        assert_eq!(probs, vec![0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_large_theta_hits_clamp() {
        let params = MplParams::new(0, 0.0, 1.0, 1e7);
        let probs: Vec<f64> = mpl(&[1, 1, 1], &params).collect();
        assert_eq!(probs, vec![0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_warm_up_emits_half() {
        let outcomes = [1, 1, 0, 1, 1, 1, 0, 0, 1, 1];
        for k in 1..=KMAX {
            let params = MplParams::new(k, 0.9, 0.7, 3.0);
            let probs: Vec<f64> = mpl(&outcomes, &params).collect();
            for (t, &p) in probs.iter().enumerate().take(k) {
                assert_eq!(p, 0.5, "trial {} of warm-up for k={}", t, k);
            }
        }
    }

    #[test]
    fn test_first_trial_after_warm_up_is_half() {
        // Memory starts empty, so the first informative trial still has f = 0.
        let params = MplParams::new(2, 0.9, 0.7, 3.0);
        let probs: Vec<f64> = mpl(&[1, 1, 1, 1], &params).collect();
        assert_eq!(probs[2], 0.5);
    }

    #[test]
    fn test_depth_one_tracks_context() {
        // k = 1, no forgetting: slot 1 sees outcome after a 1, slot 0 after a 0.
        let params = MplParams::new(1, 1.0, 1.0, 1.0);
        let logits: Vec<f64> = mpl_logits(&[1, 0, 1, 0, 1], &params).collect();
        // t=0 warm-up; t=1 slot 1 empty; t=2 slot 0 empty; t=3 slot 1 has -1; t=4 slot 0 has +1.
        assert_eq!(logits, vec![0.0, 0.0, 0.0, -1.0, 1.0]);
    }

    #[test]
    fn test_decay_applies_to_all_slots() {
        let params = MplParams::new(1, 0.5, 1.0, 1.0);
        let logits: Vec<f64> = mpl_logits(&[1, 1, 0, 1], &params).collect();
        // t=1: slot 1 <- +1. t=2: f = 1; decay -> 0.5; slot 1 <- 0.5 - 1 = -0.5.
        // t=3: context 0, slot 0 empty.
        assert_eq!(logits, vec![0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_probabilities_in_unit_interval() {
        let outcomes: Vec<u8> = (0..300).map(|i| u8::from(i % 3 != 0)).collect();
        for k in 0..=KMAX {
            for &theta in &[0.0, 0.5, 5.0, 1e3, 1e6] {
                let params = MplParams::new(k, 0.95, 0.9, theta);
                for p in mpl(&outcomes, &params) {
                    assert!((0.0..=1.0).contains(&p), "p = {} out of range", p);
                }
            }
        }
    }

    #[test]
    fn test_restartable() {
        let outcomes = [0, 1, 1, 0, 1, 1, 1];
        let params = MplParams::new(2, 0.8, 0.6, 2.5);
        let first: Vec<f64> = mpl(&outcomes, &params).collect();
        let second: Vec<f64> = mpl(&outcomes, &params).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_exact_size() {
        let params = MplParams::new(3, 0.8, 0.6, 2.5);
        let mut it = mpl(&[0, 1, 1, 0, 1], &params);
        assert_eq!(it.len(), 5);
        it.next();
        assert_eq!(it.len(), 4);
    }

    #[test]
    fn test_empty_sequence() {
        let params = MplParams::new(2, 0.8, 0.6, 2.5);
        assert_eq!(mpl(&[], &params).count(), 0);
    }
}
