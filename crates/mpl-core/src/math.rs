//! Math functions for no_std compatibility.
//!
//! In no_std mode, f64 doesn't have transcendental methods like exp, ln, sqrt.
//! This module provides them through libm, together with the handful of
//! logistic helpers the model needs.

use crate::constants::LOGIT_CLAMP;

/// Square root.
#[inline]
pub fn sqrt(x: f64) -> f64 {
    libm::sqrt(x)
}

/// Natural logarithm.
#[inline]
pub fn ln(x: f64) -> f64 {
    libm::log(x)
}

/// `ln(1 + x)`, accurate for small `x`.
#[inline]
pub fn ln_1p(x: f64) -> f64 {
    libm::log1p(x)
}

/// Exponential (e^x).
#[inline]
pub fn exp(x: f64) -> f64 {
    libm::exp(x)
}

/// Ceiling (round up).
#[inline]
pub fn ceil(x: f64) -> f64 {
    libm::ceil(x)
}

/// Floor (round down).
#[inline]
pub fn floor(x: f64) -> f64 {
    libm::floor(x)
}

/// Absolute value.
#[inline]
pub fn abs(x: f64) -> f64 {
    libm::fabs(x)
}

/// Square (x^2).
#[inline]
pub fn sq(x: f64) -> f64 {
    x * x
}

/// Logistic function `1 / (1 + e^-x)`, evaluated without overflow.
#[inline]
pub fn expit(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + exp(-x))
    } else {
        let e = exp(x);
        e / (1.0 + e)
    }
}

/// Probability of choosing option 1 for logit `f`.
///
/// Logits above [`LOGIT_CLAMP`] map to exactly 1. There is no lower clamp:
/// `exp` underflows gracefully to 0 for very negative logits.
#[inline]
pub fn logit_to_probability(f: f64) -> f64 {
    if f > LOGIT_CLAMP {
        1.0
    } else {
        let e = exp(f);
        e / (1.0 + e)
    }
}

/// `(ln p, ln(1 - p))` for `p = expit(f)`.
///
/// Both terms stay finite for any finite `f`, including logits beyond the
/// probability clamp.
#[inline]
pub fn log_sigmoid_pair(f: f64) -> (f64, f64) {
    if f > 0.0 {
        let tail = ln_1p(exp(-f));
        (-tail, -f - tail)
    } else {
        let tail = ln_1p(exp(f));
        (f - tail, -tail)
    }
}

/// `ln(Σ exp(x_i))` computed relative to the maximum term.
///
/// Terms equal to `-inf` (log of a zero weight) contribute nothing. An empty
/// slice or a slice of only `-inf` returns `-inf`.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY || max == f64::INFINITY {
        return max;
    }
    let sum: f64 = values.iter().map(|&v| exp(v - max)).sum();
    max + ln(sum)
}
