//! Synthetic agents: Bernoulli choices drawn from the model's probabilities.

extern crate alloc;

use alloc::vec::Vec;

use rand::Rng;

use crate::recurrence::mpl;
use crate::types::MplParams;

/// Simulate one agent's choices over `outcomes`.
///
/// Each choice is 1 with the probability the model assigns to that trial.
pub fn simulate_choices<R: Rng + ?Sized>(
    outcomes: &[u8],
    params: &MplParams,
    rng: &mut R,
) -> Vec<u8> {
    mpl(outcomes, params)
        .map(|p1| {
            let u: f64 = rng.random();
            u8::from(u < p1)
        })
        .collect()
}

/// Random outcome sequence where the majority outcome (1) occurs with
/// probability `p_majority` on each trial.
///
/// # Panics
///
/// Panics if `p_majority` is outside [0, 1].
pub fn random_outcomes<R: Rng + ?Sized>(len: usize, p_majority: f64, rng: &mut R) -> Vec<u8> {
    assert!(
        (0.0..=1.0).contains(&p_majority),
        "majority probability must be in [0, 1]"
    );
    (0..len)
        .map(|_| {
            let u: f64 = rng.random();
            u8::from(u < p_majority)
        })
        .collect()
}

/// Mean response over the final `window` values.
///
/// Uses the whole slice when it is shorter than `window`. Accepts choices
/// (0/1) or probabilities.
///
/// # Panics
///
/// Panics if `values` is empty or `window` is zero.
pub fn mean_response<T: Copy + Into<f64>>(values: &[T], window: usize) -> f64 {
    assert!(!values.is_empty(), "Cannot compute mean response of empty slice");
    assert!(window > 0, "mean response window must be positive");
    let tail = &values[values.len().saturating_sub(window)..];
    tail.iter().map(|&v| v.into()).sum::<f64>() / tail.len() as f64
}

/// Mean lag-one cross-correlation `(2x_{t-1} - 1)(2y_t - 1)` over the final
/// `window` trials.
///
/// Positive values mean choices tend to repeat the previous outcome. Uses
/// every trial after the first when the sequence is shorter than
/// `window + 1`.
///
/// # Panics
///
/// Panics if the slices differ in length, hold fewer than two trials, or
/// `window` is zero.
pub fn cross_correlation(outcomes: &[u8], choices: &[u8], window: usize) -> f64 {
    assert_eq!(outcomes.len(), choices.len(), "outcomes and choices must have equal length");
    assert!(outcomes.len() >= 2, "cross-correlation needs at least two trials");
    assert!(window > 0, "cross-correlation window must be positive");
    let start = outcomes.len().saturating_sub(window).max(1);
    let n = outcomes.len() - start;
    (start..outcomes.len())
        .map(|t| {
            let x = 2.0 * f64::from(outcomes[t - 1]) - 1.0;
            let y = 2.0 * f64::from(choices[t]) - 1.0;
            x * y
        })
        .sum::<f64>()
        / n as f64
}

/// `pattern` repeated until it fills `len` trials.
///
/// # Panics
///
/// Panics if `pattern` is empty.
pub fn repeat_pattern(pattern: &[u8], len: usize) -> Vec<u8> {
    assert!(!pattern.is_empty(), "pattern must not be empty");
    pattern.iter().copied().cycle().take(len).collect()
}

/// Expected fraction of trials from `skip` on where an agent's choice
/// matches the outcome.
///
/// Computed exactly from the choice probabilities rather than by
/// simulation: a trial with outcome 1 is matched with probability `p_t`,
/// one with outcome 0 with `1 - p_t`.
///
/// # Panics
///
/// Panics if `skip >= outcomes.len()`.
pub fn pattern_accuracy(outcomes: &[u8], params: &MplParams, skip: usize) -> f64 {
    assert!(skip < outcomes.len(), "skip must leave at least one trial");
    let matched: f64 = mpl(outcomes, params)
        .zip(outcomes)
        .skip(skip)
        .map(|(p1, &x)| if x == 1 { p1 } else { 1.0 - p1 })
        .sum();
    matched / (outcomes.len() - skip) as f64
}
