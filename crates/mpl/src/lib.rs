//! Model comparison and posterior-predictive checks for the MPL
//! probability-matching model.
//!
//! The numerical core (recurrence, likelihood, sampler, HDI) lives in
//! `mpl_core` and is re-exported here. This crate adds what a study needs
//! around it:
//!
//! - [`data`]: behavioral and posterior-sample CSV loaders, plus a JSON cache
//! - [`validation`]: seeded cross-validation folds and LPPD scoring
//! - [`predictive`]: synthetic-agent studies of mean responses
//! - [`hyperparams`]: summaries of the population-level parameters
//! - [`output`]: two-decimal terminal rows and JSON reports
//!
//! # Quick Start
//!
//! ```ignore
//! use mpl::{Config, data, validation};
//! use std::path::Path;
//!
//! let cfg = Config::new();
//! let bdata = data::DataCache::beside("bdata.csv").load()?;
//! let folds = validation::Folds::new(bdata.len(), cfg.n_folds, cfg.seed)?;
//! let report = validation::cross_validate(&bdata, &folds, &cfg, |fold| {
//!     data::load_posterior_csv(Path::new(&format!("cv-{:02}.csv", fold)), cfg.posterior_warmup)
//! })?;
//! println!("deviance = {:.2}", report.deviance);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod data;
pub mod error;
pub mod hyperparams;
pub mod output;
pub mod predictive;
pub mod rng;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};

// Re-export the numerical core
pub use mpl_core::{
    constants, cross_correlation, depth_responsibilities, expected_depth, hdi, log_likelihood,
    marginal_log_likelihood, math, mean_response, mpl, mpl_logits, mpl_reference,
    pattern_accuracy, quantile, random_outcomes, repeat_pattern, sample_depth, sample_parameters,
    simulate_choices, ChoiceSequence, ClassProbabilities, ContinuousParams, MplParams,
    PosteriorError, PosteriorRow, SequenceError, Summary, DEFAULT_SEED, KMAX,
};
