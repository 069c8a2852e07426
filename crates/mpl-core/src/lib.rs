//! Core recurrence and posterior machinery for the MPL probability-matching model.
//!
//! This crate holds the computational heart of the MPL study: the trial-by-trial
//! response recurrence, an independent reference implementation used as a test
//! oracle, exact log-likelihoods over the discrete memory depth, and the
//! posterior-predictive sampler that turns one fitted hierarchical posterior row
//! into synthetic agents. It is designed to work in `no_std` environments with
//! only an allocator.
//!
//! # Features
//!
//! - `std` (default): Enable standard library support in the dependencies
//!
//! # Usage
//!
//! This crate is typically used through the `mpl` crate, which provides data
//! loading, cross-validation and posterior-predictive studies. It can be used
//! directly when sequences and posterior rows are already in memory.
//!
//! ```ignore
//! use mpl_core::{mpl, log_likelihood, ChoiceSequence, MplParams};
//!
//! let seq = ChoiceSequence::new(vec![1, 1, 0, 1], vec![0, 1, 1, 1])?;
//! let params = MplParams::new(1, 0.9, 0.8, 2.0);
//! let probs: Vec<f64> = mpl(seq.outcomes(), &params).collect();
//! let ll = log_likelihood(&seq, 0, seq.len(), &params);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod constants;
pub mod likelihood;
pub mod math;
pub mod recurrence;
pub mod reference;
pub mod sampler;
pub mod simulation;
pub mod statistics;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::{DEFAULT_CREDIBLE_MASS, DEFAULT_SEED, KMAX, LOGIT_CLAMP, THETA_MAX};
pub use likelihood::{
    depth_responsibilities, expected_depth, log_likelihood, marginal_log_likelihood,
};
pub use recurrence::{mpl, mpl_logits, Logits, Probabilities};
pub use reference::{mpl_reference, ReferenceProbabilities};
pub use sampler::{sample_depth, sample_parameters, ParameterDraws, PosteriorError, PosteriorRow};
pub use simulation::{
    cross_correlation, mean_response, pattern_accuracy, random_outcomes, repeat_pattern,
    simulate_choices,
};
pub use statistics::{hdi, quantile, Summary};
pub use types::{
    ChoiceSequence, ClassProbabilities, ContextWindow, ContinuousParams, Matrix3, MplParams,
    SequenceError, Vector3,
};
