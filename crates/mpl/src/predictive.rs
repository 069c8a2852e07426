//! Posterior-predictive studies built from synthetic MPL agents.
//!
//! Every study draws agents from posterior rows, runs them on outcome
//! sequences (fresh random ones or the real participants'), and compares
//! their mean responses with the observed data. Each study draws from its
//! own random stream, so reported statistics of different studies are
//! independent.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use mpl_core::constants::THETA_MAX;
use mpl_core::{
    cross_correlation, expected_depth, mean_response, mpl, pattern_accuracy, random_outcomes,
    repeat_pattern, simulate_choices, MplParams,
};

use crate::config::Config;
use crate::data::{BehavioralData, PosteriorSample};
use crate::rng::{counter_rng_seed, item_rng};

/// Agents simulated per parallel work item in curve studies.
const CURVE_CHUNK: usize = 1024;

/// Deterministic outcome patterns for the pattern-search study.
pub const SEARCH_PATTERNS: [&[u8]; 3] = [&[0, 1], &[0, 0, 1, 1], &[1, 1, 0, 0, 1, 0]];

/// Leading trials excluded from pattern-search accuracy.
pub const PATTERN_SKIP: usize = 100;

/// Majority-outcome probabilities covered by [`majority_probability_sweep`].
pub const SWEEP_PROBABILITIES: [f64; 6] = [0.5, 0.6, 0.7, 0.8, 0.9, 1.0];

/// Random stream owned by one study.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Study {
    Distribution = 1,
    Cohort = 2,
    Curve = 3,
}

/// Base seed of `study`'s stream; per-item generators derive from it.
fn study_seed(seed: u64, study: Study) -> u64 {
    counter_rng_seed(seed, study as u64)
}

/// Replace parts of every drawn parameter tuple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamOverride {
    /// Fixed memory depth.
    pub depth: Option<usize>,
    /// Fixed recency weight.
    pub rho: Option<f64>,
    /// Fixed determinism.
    pub theta: Option<f64>,
}

impl ParamOverride {
    /// Keep every drawn value.
    pub fn none() -> Self {
        Self::default()
    }

    /// Force the memory depth.
    pub fn depth(k: usize) -> Self {
        Self {
            depth: Some(k),
            ..Self::default()
        }
    }

    /// An agent that always picks the outcome its single memory slot
    /// favors: depth 0, no recency bias, maximal determinism.
    pub fn frequency_maximizer() -> Self {
        Self {
            depth: Some(0),
            rho: Some(1.0),
            theta: Some(THETA_MAX),
        }
    }

    /// The eight combinations of forcing depth 0, rho = 1 and maximal
    /// theta, labelled by what they force.
    pub fn performance_grid() -> [(&'static str, ParamOverride); 8] {
        let maximizer = Self::frequency_maximizer();
        let (k0, rho1, theta_max) = (maximizer.depth, maximizer.rho, maximizer.theta);
        let grid = |depth, rho, theta| Self { depth, rho, theta };
        [
            ("drawn", grid(None, None, None)),
            ("k = 0", grid(k0, None, None)),
            ("rho = 1", grid(None, rho1, None)),
            ("theta = max", grid(None, None, theta_max)),
            ("k = 0, rho = 1", grid(k0, rho1, None)),
            ("k = 0, theta = max", grid(k0, None, theta_max)),
            ("rho = 1, theta = max", grid(None, rho1, theta_max)),
            ("k = 0, rho = 1, theta = max", grid(k0, rho1, theta_max)),
        ]
    }

    /// Apply the override to a drawn tuple.
    pub fn apply(&self, params: MplParams) -> MplParams {
        MplParams::new(
            self.depth.unwrap_or(params.k),
            params.a,
            self.rho.unwrap_or(params.rho),
            self.theta.unwrap_or(params.theta),
        )
    }
}

/// Each participant's posterior mean memory depth.
///
/// Averages the depth responsibilities over all samples, using the
/// participant's own continuous parameters when the sampler recorded them.
pub fn depth_expectations(samples: &[PosteriorSample], data: &BehavioralData) -> Vec<f64> {
    if samples.is_empty() {
        tracing::warn!("No posterior rows; depth expectations are empty");
        return Vec::new();
    }
    data.participants
        .par_iter()
        .enumerate()
        .map(|(i, participant)| {
            let seq = &participant.sequence;
            let total: f64 = samples
                .iter()
                .map(|s| {
                    expected_depth(seq, 0, seq.len(), s.row.class_probs(), &s.subject_params(i))
                })
                .sum();
            total / samples.len() as f64
        })
        .collect()
}

/// Mean response of one synthetic agent per posterior sample, each on a
/// fresh random outcome sequence.
///
/// `depth` forces the memory depth when given.
pub fn mean_response_distribution(
    samples: &[PosteriorSample],
    depth: Option<usize>,
    cfg: &Config,
) -> Vec<f64> {
    let over = ParamOverride {
        depth,
        ..ParamOverride::none()
    };
    let seed = counter_rng_seed(
        study_seed(cfg.seed, Study::Distribution),
        depth.map_or(0, |k| k as u64 + 1),
    );
    samples
        .par_iter()
        .enumerate()
        .map(|(i, sample)| {
            let mut rng = item_rng(seed, i as u64);
            let params = over.apply(sample.row.draw(&mut rng));
            let outcomes = random_outcomes(cfg.n_trials, cfg.majority_probability, &mut rng);
            let choices = simulate_choices(&outcomes, &params, &mut rng);
            mean_response(&choices, cfg.mean_response_window)
        })
        .collect()
}

/// Predicted versus observed cohort statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortReport {
    /// Mean of the cohort's mean responses, one per replicate.
    pub means: Vec<f64>,
    /// Standard deviation of the cohort's mean responses, one per replicate.
    pub sds: Vec<f64>,
    /// Mean of the observed mean responses.
    pub observed_mean: f64,
    /// Standard deviation of the observed mean responses.
    pub observed_sd: f64,
    /// Mean lag-one cross-correlation of the cohort, one per replicate.
    pub cross_correlations: Vec<f64>,
    /// Mean lag-one cross-correlation of the observed participants.
    pub observed_cross_correlation: f64,
}

impl CohortReport {
    /// Fraction of replicates whose cohort mean exceeds the observed one.
    pub fn prob_mean_above(&self) -> f64 {
        fraction_above(&self.means, self.observed_mean)
    }

    /// Fraction of replicates whose cohort sd exceeds the observed one.
    pub fn prob_sd_above(&self) -> f64 {
        fraction_above(&self.sds, self.observed_sd)
    }

    /// Fraction of replicates whose cross-correlation falls below the
    /// observed one.
    pub fn prob_cross_correlation_below(&self) -> f64 {
        if self.cross_correlations.is_empty() {
            return 0.0;
        }
        let below = self
            .cross_correlations
            .iter()
            .filter(|&&c| c < self.observed_cross_correlation)
            .count();
        below as f64 / self.cross_correlations.len() as f64
    }
}

fn fraction_above(values: &[f64], threshold: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|&&v| v > threshold).count() as f64 / values.len() as f64
}

/// Mean and sample standard deviation (n − 1; 0 below two values).
fn mean_sd(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

/// Replicate the whole cohort on the participants' real outcome sequences.
///
/// Up to `cfg.predictive_reps` posterior rows are picked without
/// replacement. For each, every participant is replaced by a synthetic agent
/// drawn from that row, and the cohort's mean responses and lag-one
/// cross-correlations over the final `cfg.mean_response_window` trials are
/// summarized.
///
/// # Panics
///
/// Panics if `samples` or `data` is empty.
pub fn cohort_mean_responses(
    samples: &[PosteriorSample],
    data: &BehavioralData,
    cfg: &Config,
) -> CohortReport {
    assert!(!samples.is_empty(), "Cannot simulate cohorts without posterior rows");
    assert!(!data.is_empty(), "Cannot simulate cohorts without participants");

    let seed = study_seed(cfg.seed, Study::Cohort);
    let window = cfg.mean_response_window;
    let reps = cfg.predictive_reps.min(samples.len());
    let picked = {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        rand::seq::index::sample(&mut rng, samples.len(), reps).into_vec()
    };
    tracing::debug!("Simulating {} cohorts of {} agents", reps, data.len());

    let stats: Vec<(f64, f64, f64)> = picked
        .par_iter()
        .enumerate()
        .map(|(r, &row_index)| {
            let row = &samples[row_index].row;
            let mut rng = item_rng(seed, r as u64);
            let (responses, correlations): (Vec<f64>, Vec<f64>) = data
                .sequences()
                .map(|seq| {
                    let params = row.draw(&mut rng);
                    let choices = simulate_choices(seq.outcomes(), &params, &mut rng);
                    agent_statistics(seq.outcomes(), &choices, window)
                })
                .unzip();
            let (mean, sd) = mean_sd(&responses);
            (mean, sd, mean_sd(&correlations).0)
        })
        .collect();

    let (observed_mean, observed_sd) = mean_sd(&data.observed_mean_responses(window));
    let (observed_cross_correlation, _) = mean_sd(&data.observed_cross_correlations(window));
    let mut report = CohortReport {
        means: Vec::with_capacity(reps),
        sds: Vec::with_capacity(reps),
        observed_mean,
        observed_sd,
        cross_correlations: Vec::with_capacity(reps),
        observed_cross_correlation,
    };
    for (mean, sd, cc) in stats {
        report.means.push(mean);
        report.sds.push(sd);
        report.cross_correlations.push(cc);
    }
    report
}

/// Mean response and lag-one cross-correlation of one agent; 0 for
/// sequences too short to define them.
fn agent_statistics(outcomes: &[u8], choices: &[u8], window: usize) -> (f64, f64) {
    let mr = if choices.is_empty() {
        0.0
    } else {
        mean_response(choices, window)
    };
    let cc = if choices.len() < 2 {
        0.0
    } else {
        cross_correlation(outcomes, choices, window)
    };
    (mr, cc)
}

/// Average per-trial choice probability of `cfg.curve_reps` synthetic agents.
///
/// Each agent comes from a uniformly chosen posterior sample, is modified by
/// `over`, and runs on a fresh random outcome sequence of `cfg.n_trials`
/// trials. Curves built from the same config share their random draws, so
/// differences between overrides reflect the overrides alone.
///
/// # Panics
///
/// Panics if `samples` is empty.
pub fn mean_response_curve(
    samples: &[PosteriorSample],
    over: ParamOverride,
    cfg: &Config,
) -> Vec<f64> {
    assert!(!samples.is_empty(), "Cannot build a curve without posterior rows");

    let seed = study_seed(cfg.seed, Study::Curve);
    let n = cfg.n_trials;
    let reps = cfg.curve_reps;
    let n_chunks = reps.div_ceil(CURVE_CHUNK);

    // Fixed chunks summed in order keep the result independent of scheduling.
    let partials: Vec<Vec<f64>> = (0..n_chunks)
        .into_par_iter()
        .map(|chunk| {
            let mut rng = item_rng(seed, chunk as u64);
            let mut acc = vec![0.0; n];
            let agents = CURVE_CHUNK.min(reps - chunk * CURVE_CHUNK);
            for _ in 0..agents {
                let sample = &samples[rng.random_range(0..samples.len())];
                let params = over.apply(sample.row.draw(&mut rng));
                let outcomes = random_outcomes(n, cfg.majority_probability, &mut rng);
                for (slot, p) in acc.iter_mut().zip(mpl(&outcomes, &params)) {
                    *slot += p;
                }
            }
            acc
        })
        .collect();

    let mut curve = vec![0.0; n];
    for partial in &partials {
        for (c, p) in curve.iter_mut().zip(partial) {
            *c += p;
        }
    }
    curve.iter_mut().for_each(|c| *c /= reps as f64);
    curve
}

/// Mean response over the final `cfg.mean_response_window` trials of the
/// curve for every override in [`ParamOverride::performance_grid`].
///
/// # Panics
///
/// Panics if `samples` is empty.
pub fn performance_grid_responses(
    samples: &[PosteriorSample],
    cfg: &Config,
) -> Vec<(&'static str, f64)> {
    ParamOverride::performance_grid()
        .into_iter()
        .map(|(label, over)| {
            let curve = mean_response_curve(samples, over, cfg);
            let mr = mean_response(&curve, cfg.mean_response_window);
            tracing::debug!("Performance grid {}: mean response {:.4}", label, mr);
            (label, mr)
        })
        .collect()
}

/// Final-trial mean response for each majority-outcome probability in
/// `probabilities`, on sequences of `cfg.n_trials` trials.
///
/// # Panics
///
/// Panics if `samples` is empty or a probability lies outside [0, 1].
pub fn majority_probability_sweep(
    samples: &[PosteriorSample],
    probabilities: &[f64],
    cfg: &Config,
) -> Vec<(f64, f64)> {
    probabilities
        .iter()
        .map(|&p| {
            let curve = mean_response_curve(
                samples,
                ParamOverride::none(),
                &cfg.clone().majority_probability(p),
            );
            (p, curve.last().copied().unwrap_or(0.5))
        })
        .collect()
}

/// Accuracy of a deterministic searcher on one repeating pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternAccuracy {
    /// Pattern as a string of 0s and 1s.
    pub pattern: String,
    /// Memory depth of the searcher.
    pub depth: usize,
    /// Expected fraction of correct choices after [`PATTERN_SKIP`] trials.
    pub accuracy: f64,
}

/// Pattern-search accuracy of perfect-memory, maximally deterministic
/// agents (A = 1, rho = 1, theta = max) of depth `0..=cfg.kmax` on each
/// pattern repeated over `cfg.n_trials` trials.
///
/// # Panics
///
/// Panics if `cfg.n_trials <= PATTERN_SKIP` or a pattern is empty.
pub fn pattern_search(patterns: &[&[u8]], cfg: &Config) -> Vec<PatternAccuracy> {
    let mut results = Vec::with_capacity(patterns.len() * (cfg.kmax + 1));
    for pattern in patterns {
        let outcomes = repeat_pattern(pattern, cfg.n_trials);
        let name: String = pattern.iter().map(|b| char::from(b'0' + b)).collect();
        for depth in 0..=cfg.kmax {
            let params = MplParams::new(depth, 1.0, 1.0, THETA_MAX);
            results.push(PatternAccuracy {
                pattern: name.clone(),
                depth,
                accuracy: pattern_accuracy(&outcomes, &params, PATTERN_SKIP),
            });
        }
    }
    results
}

/// The `width`-trial window where curve `a` exceeds curve `b` by the most
/// on average. Returns `(start, end, mean difference)`, or `None` if no
/// window has a positive difference.
///
/// # Panics
///
/// Panics if the curves differ in length or `width` is zero.
pub fn max_difference_window(a: &[f64], b: &[f64], width: usize) -> Option<(usize, usize, f64)> {
    assert_eq!(a.len(), b.len(), "curves must have equal length");
    assert!(width > 0, "window width must be positive");

    let mut best: Option<(usize, usize, f64)> = None;
    for start in 0..a.len().saturating_sub(width) {
        let end = start + width;
        let diff = a[start..end]
            .iter()
            .zip(&b[start..end])
            .map(|(x, y)| x - y)
            .sum::<f64>()
            / width as f64;
        if diff > best.map_or(0.0, |(_, _, d)| d) {
            best = Some((start, end, diff));
        }
    }
    best
}
