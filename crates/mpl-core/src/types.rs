//! Type aliases and common types.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

use nalgebra::{SMatrix, SVector};

use crate::constants::{KMAX, N_DEPTHS};

/// 3-dimensional vector for the untransformed (A, rho, theta) location.
pub type Vector3 = SVector<f64, 3>;

/// 3x3 scale matrix of the continuous-parameter multivariate t.
pub type Matrix3 = SMatrix<f64, 3, 3>;

/// Probabilities of each memory depth `0..=KMAX`.
pub type ClassProbabilities = [f64; N_DEPTHS];

/// Errors raised when building a [`ChoiceSequence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// Outcome and choice sequences differ in length.
    LengthMismatch {
        /// Number of outcomes.
        outcomes: usize,
        /// Number of choices.
        choices: usize,
    },

    /// A value other than 0 or 1 was found.
    NotBinary {
        /// Trial index of the offending value (0-indexed).
        trial: usize,
        /// The offending value.
        value: u8,
    },
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::LengthMismatch { outcomes, choices } => write!(
                f,
                "outcome and choice sequences differ in length: {} vs {}",
                outcomes, choices
            ),
            SequenceError::NotBinary { trial, value } => {
                write!(f, "non-binary value {} at trial {}", value, trial)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SequenceError {}

/// One participant's trials: the exogenous outcome sequence that drives the
/// model and the participant's own choices that the likelihood scores.
///
/// Both sequences are binary and always have equal length. The value is
/// immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSequence {
    outcomes: Vec<u8>,
    choices: Vec<u8>,
}

impl ChoiceSequence {
    /// Build a sequence, validating lengths and binary values.
    pub fn new(outcomes: Vec<u8>, choices: Vec<u8>) -> Result<Self, SequenceError> {
        if outcomes.len() != choices.len() {
            return Err(SequenceError::LengthMismatch {
                outcomes: outcomes.len(),
                choices: choices.len(),
            });
        }
        for seq in [&outcomes, &choices] {
            if let Some((trial, &value)) = seq.iter().enumerate().find(|&(_, &v)| v > 1) {
                return Err(SequenceError::NotBinary { trial, value });
            }
        }
        Ok(Self { outcomes, choices })
    }

    /// Majority-outcome indicators, one per trial.
    pub fn outcomes(&self) -> &[u8] {
        &self.outcomes
    }

    /// Participant choices, one per trial.
    pub fn choices(&self) -> &[u8] {
        &self.choices
    }

    /// Number of trials.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True if the sequence has no trials.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Continuous MPL parameters without a memory depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuousParams {
    /// Decay (forgetting) factor applied to every memory slot, in [0, 1].
    pub a: f64,
    /// Recency weight of the active slot, in [0, 1].
    pub rho: f64,
    /// Determinism of choice, non-negative and finite.
    pub theta: f64,
}

impl ContinuousParams {
    /// Create continuous parameters.
    ///
    /// # Panics
    ///
    /// Panics if `a` or `rho` is outside [0, 1] or `theta` is negative or
    /// not finite.
    pub fn new(a: f64, rho: f64, theta: f64) -> Self {
        assert!((0.0..=1.0).contains(&a), "A must be in [0, 1], got {}", a);
        assert!((0.0..=1.0).contains(&rho), "rho must be in [0, 1], got {}", rho);
        assert!(
            theta >= 0.0 && theta.is_finite(),
            "theta must be finite and non-negative, got {}",
            theta
        );
        Self { a, rho, theta }
    }

    /// Attach a memory depth.
    pub fn with_depth(self, k: usize) -> MplParams {
        MplParams::new(k, self.a, self.rho, self.theta)
    }
}

/// Full MPL parameter tuple `(k, A, rho, theta)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MplParams {
    /// Memory depth: number of recent outcomes that select the active slot.
    pub k: usize,
    /// Decay (forgetting) factor applied to every memory slot, in [0, 1].
    pub a: f64,
    /// Recency weight of the active slot, in [0, 1].
    pub rho: f64,
    /// Determinism of choice, non-negative and finite.
    pub theta: f64,
}

impl MplParams {
    /// Create a parameter tuple.
    ///
    /// # Panics
    ///
    /// Panics if `k > KMAX`, if `a` or `rho` is outside [0, 1], or if `theta`
    /// is negative or not finite. An out-of-range depth is a caller bug.
    pub fn new(k: usize, a: f64, rho: f64, theta: f64) -> Self {
        assert!(k <= KMAX, "memory depth k must be in [0, {}], got {}", KMAX, k);
        let cont = ContinuousParams::new(a, rho, theta);
        Self {
            k,
            a: cont.a,
            rho: cont.rho,
            theta: cont.theta,
        }
    }

    /// The continuous part of the tuple.
    pub fn continuous(&self) -> ContinuousParams {
        ContinuousParams {
            a: self.a,
            rho: self.rho,
            theta: self.theta,
        }
    }

    /// Number of memory slots, `2^k`.
    pub fn num_slots(&self) -> usize {
        1 << self.k
    }
}

/// The most recent k outcomes as a binary number (newest bit lowest).
///
/// Bits older than the k-th most recent outcome are masked off by `2^k - 1`,
/// so the window doubles as an index into the `2^k` memory slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindow {
    bits: u32,
    mask: u32,
}

impl ContextWindow {
    /// Empty window for memory depth `k`.
    pub fn new(k: usize) -> Self {
        debug_assert!(k <= KMAX, "memory depth out of range");
        Self {
            bits: 0,
            mask: (1u32 << k) - 1,
        }
    }

    /// Shift in the newest outcome, dropping the oldest.
    #[inline]
    pub fn push(&mut self, outcome: u8) {
        self.bits = ((self.bits << 1) | u32::from(outcome)) & self.mask;
    }

    /// Slot index selected by the current window.
    #[inline]
    pub fn index(&self) -> usize {
        self.bits as usize
    }
}
