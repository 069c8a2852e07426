//! Exact log-likelihood of observed choices under the MPL model.
//!
//! The recurrence runs over the outcome sequence; the choices are scored
//! against its logits. Per trial the contribution is `ln p_t` when the
//! participant chose 1 and `ln(1 - p_t)` otherwise, evaluated directly from
//! the logit so that no term is ever `ln 0`.
//!
//! The memory depth k is discrete, so the depth-marginal likelihood under a
//! class-probability vector π is
//!
//! ```text
//! ln p(y | π, A, rho, theta) = logsumexp_k( ln π_k + ln p(y | k, A, rho, theta) )
//! ```

use crate::constants::N_DEPTHS;
use crate::math;
use crate::recurrence::mpl_logits;
use crate::types::{ChoiceSequence, ClassProbabilities, ContinuousParams, MplParams};

/// Natural-log probability of the choices in trials `offset..offset + window`.
///
/// The recurrence is run over the first `offset + window` outcomes, so the
/// trials before `offset` still shape the memory but are not scored.
///
/// # Panics
///
/// Panics if `offset + window` exceeds the sequence length.
pub fn log_likelihood(
    seq: &ChoiceSequence,
    offset: usize,
    window: usize,
    params: &MplParams,
) -> f64 {
    let end = offset + window;
    assert!(
        end <= seq.len(),
        "likelihood window {}..{} exceeds sequence length {}",
        offset,
        end,
        seq.len()
    );

    mpl_logits(&seq.outcomes()[..end], params)
        .zip(seq.choices())
        .skip(offset)
        .map(|(f, &y)| {
            let (log_p, log_q) = math::log_sigmoid_pair(f);
            if y == 1 {
                log_p
            } else {
                log_q
            }
        })
        .sum()
}

/// `ln π_k + ln p(y | k, ...)` for every depth; `-inf` where `π_k = 0`.
fn depth_log_terms(
    seq: &ChoiceSequence,
    offset: usize,
    window: usize,
    class_probs: &ClassProbabilities,
    cont: &ContinuousParams,
) -> [f64; N_DEPTHS] {
    debug_assert!(
        class_probs.iter().all(|&p| p >= 0.0),
        "class probabilities must be non-negative"
    );
    core::array::from_fn(|k| {
        let weight = class_probs[k];
        if weight > 0.0 {
            math::ln(weight) + log_likelihood(seq, offset, window, &cont.with_depth(k))
        } else {
            f64::NEG_INFINITY
        }
    })
}

/// Log-likelihood with the memory depth integrated out.
///
/// Depths with zero class probability are skipped rather than evaluated.
pub fn marginal_log_likelihood(
    seq: &ChoiceSequence,
    offset: usize,
    window: usize,
    class_probs: &ClassProbabilities,
    cont: &ContinuousParams,
) -> f64 {
    math::log_sum_exp(&depth_log_terms(seq, offset, window, class_probs, cont))
}

/// Posterior probability of each memory depth given the observed choices.
///
/// Returns all zeros if every class probability is zero.
pub fn depth_responsibilities(
    seq: &ChoiceSequence,
    offset: usize,
    window: usize,
    class_probs: &ClassProbabilities,
    cont: &ContinuousParams,
) -> ClassProbabilities {
    let terms = depth_log_terms(seq, offset, window, class_probs, cont);
    let total = math::log_sum_exp(&terms);
    if total == f64::NEG_INFINITY {
        return [0.0; N_DEPTHS];
    }
    terms.map(|term| math::exp(term - total))
}

/// Posterior mean memory depth given the observed choices.
pub fn expected_depth(
    seq: &ChoiceSequence,
    offset: usize,
    window: usize,
    class_probs: &ClassProbabilities,
    cont: &ContinuousParams,
) -> f64 {
    depth_responsibilities(seq, offset, window, class_probs, cont)
        .iter()
        .enumerate()
        .map(|(k, r)| k as f64 * r)
        .sum()
}
