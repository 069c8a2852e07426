//! Cross-validated log pointwise predictive density (LPPD).
//!
//! Participants are shuffled with a seeded generator and split into equal
//! folds. The model is fitted once per fold with that fold's participants
//! held out; each held-out participant is then scored against the fold's
//! posterior rows:
//!
//! ```text
//! lppd = Σ_subject [ logsumexp_s( ln p(y_subject | row_s) ) − ln S ]
//! deviance = −2 Σ_fold lppd_fold
//! ```
//!
//! `ln p(y | row_s)` draws one continuous tuple from the row's
//! multivariate t and marginalizes the memory depth exactly.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::Serialize;

use mpl_core::math::{self, log_sum_exp};
use mpl_core::{marginal_log_likelihood, ChoiceSequence, PosteriorRow};

use crate::config::Config;
use crate::data::{BehavioralData, PosteriorSample};
use crate::error::{Error, Result};
use crate::rng::{counter_rng_seed, item_rng};

/// Seeded partition of participants into equal cross-validation folds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folds {
    order: Vec<usize>,
    fold_size: usize,
}

impl Folds {
    /// Shuffle `0..n_participants` and split into `n_folds` equal folds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] unless `n_participants` is a positive
    /// multiple of a positive `n_folds`.
    pub fn new(n_participants: usize, n_folds: usize, seed: u64) -> Result<Self> {
        if n_folds == 0 || n_participants == 0 || n_participants % n_folds != 0 {
            return Err(Error::Config(format!(
                "{} participants cannot be split into {} equal folds",
                n_participants, n_folds
            )));
        }
        let mut order: Vec<usize> = (0..n_participants).collect();
        order.shuffle(&mut Xoshiro256PlusPlus::seed_from_u64(seed));
        Ok(Self {
            order,
            fold_size: n_participants / n_folds,
        })
    }

    /// Number of folds.
    pub fn n_folds(&self) -> usize {
        self.order.len() / self.fold_size
    }

    /// Participants held out of fold `fold`.
    ///
    /// # Panics
    ///
    /// Panics if `fold >= n_folds()`.
    pub fn held_out(&self, fold: usize) -> &[usize] {
        assert!(fold < self.n_folds(), "fold index out of range");
        &self.order[fold * self.fold_size..(fold + 1) * self.fold_size]
    }

    /// Participants the model is fitted on for fold `fold`.
    ///
    /// # Panics
    ///
    /// Panics if `fold >= n_folds()`.
    pub fn training(&self, fold: usize) -> Vec<usize> {
        assert!(fold < self.n_folds(), "fold index out of range");
        let (start, end) = (fold * self.fold_size, (fold + 1) * self.fold_size);
        self.order[..start]
            .iter()
            .chain(&self.order[end..])
            .copied()
            .collect()
    }
}

/// Log-likelihood of `seq` under one posterior row.
///
/// Draws one continuous tuple from the row, then integrates the depth out
/// with the row's class probabilities.
pub fn row_log_density<R: Rng + ?Sized>(
    row: &PosteriorRow,
    seq: &ChoiceSequence,
    rng: &mut R,
) -> f64 {
    let cont = row.draw_continuous(rng);
    marginal_log_likelihood(seq, 0, seq.len(), row.class_probs(), &cont)
}

/// LPPD of `sequences` under posterior `samples`.
///
/// At most `max_rows` rows are used, subsampled without replacement. Every
/// participant is scored against the same rows, in parallel, each with its
/// own generator derived from `seed`.
///
/// # Panics
///
/// Panics if `samples` is empty or `max_rows` is zero.
pub fn lppd(
    samples: &[PosteriorSample],
    sequences: &[&ChoiceSequence],
    max_rows: usize,
    seed: u64,
) -> f64 {
    assert!(!samples.is_empty(), "Cannot compute LPPD without posterior rows");
    assert!(max_rows > 0, "max_rows must be positive");

    let rows: Vec<&PosteriorRow> = if samples.len() > max_rows {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        rand::seq::index::sample(&mut rng, samples.len(), max_rows)
            .into_iter()
            .map(|i| &samples[i].row)
            .collect()
    } else {
        samples.iter().map(|s| &s.row).collect()
    };
    let log_s = math::ln(rows.len() as f64);

    let per_subject: Vec<f64> = sequences
        .par_iter()
        .enumerate()
        .map(|(i, seq)| {
            let mut rng = item_rng(seed, i as u64);
            let densities: Vec<f64> = rows
                .iter()
                .map(|row| row_log_density(row, seq, &mut rng))
                .collect();
            log_sum_exp(&densities) - log_s
        })
        .collect();
    // Summed in participant order so the total does not depend on scheduling.
    per_subject.iter().sum()
}

/// Cross-validation deviance: `−2 Σ lppd`.
pub fn cv_deviance(fold_lppds: &[f64]) -> f64 {
    -2.0 * fold_lppds.iter().sum::<f64>()
}

/// Result of a full cross-validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvReport {
    /// LPPD of each fold's held-out participants.
    pub fold_lppds: Vec<f64>,
    /// `−2 Σ fold_lppds`.
    pub deviance: f64,
}

/// Score every fold.
///
/// `load_fold(i)` returns the posterior samples fitted without fold `i`'s
/// participants; folds are loaded one at a time.
pub fn cross_validate<F>(
    data: &BehavioralData,
    folds: &Folds,
    cfg: &Config,
    mut load_fold: F,
) -> Result<CvReport>
where
    F: FnMut(usize) -> Result<Vec<PosteriorSample>>,
{
    let mut fold_lppds = Vec::with_capacity(folds.n_folds());
    for fold in 0..folds.n_folds() {
        let samples = load_fold(fold)?;
        if samples.is_empty() {
            return Err(Error::Config(format!("fold {} has no posterior rows", fold)));
        }
        let sequences: Vec<&ChoiceSequence> = folds
            .held_out(fold)
            .iter()
            .map(|&i| &data.participants[i].sequence)
            .collect();
        let value = lppd(
            &samples,
            &sequences,
            cfg.lppd_max_rows,
            counter_rng_seed(cfg.seed, fold as u64),
        );
        fold_lppds.push(value);
        tracing::info!(
            "Fold {}/{}: lppd = {:.2} (running total {:.2})",
            fold + 1,
            folds.n_folds(),
            value,
            fold_lppds.iter().sum::<f64>()
        );
    }
    let deviance = cv_deviance(&fold_lppds);
    Ok(CvReport {
        fold_lppds,
        deviance,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn folds_partition_every_participant(
            n_folds in 1usize..13,
            per_fold in 1usize..8,
            seed in any::<u64>(),
        ) {
            let n = n_folds * per_fold;
            let folds = Folds::new(n, n_folds, seed).unwrap();
            let mut seen = vec![0usize; n];
            for f in 0..n_folds {
                prop_assert_eq!(folds.held_out(f).len(), per_fold);
                prop_assert_eq!(folds.training(f).len(), n - per_fold);
                for &i in folds.held_out(f) {
                    seen[i] += 1;
                }
            }
            prop_assert!(seen.iter().all(|&c| c == 1));
        }
    }
}
