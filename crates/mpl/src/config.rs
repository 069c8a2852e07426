//! Run configuration for cross-validation and posterior-predictive studies.

use std::path::Path;

use serde::{Deserialize, Serialize};

use mpl_core::constants::{
    DEFAULT_CREDIBLE_MASS, DEFAULT_MAJORITY_PROBABILITY, DEFAULT_SEED, KMAX,
    MEAN_RESPONSE_WINDOW, N_TRIALS,
};

use crate::error::{Error, Result};

/// Environment variable that overrides [`Config::seed`].
pub const SEED_ENV: &str = "MPL_SEED";

/// Settings shared by every study the binary runs.
///
/// Use the presets and the builder methods:
///
/// ```
/// use mpl::Config;
///
/// let cfg = Config::quick().seed(7).n_folds(4);
/// assert_eq!(cfg.n_folds, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deepest memory depth covered by the per-depth predictive studies.
    ///
    /// Default: 3
    pub kmax: usize,

    /// Number of cross-validation folds.
    ///
    /// Default: 12
    pub n_folds: usize,

    /// Posterior rows kept (subsampled without replacement) per LPPD fold.
    ///
    /// Default: 1000
    pub lppd_max_rows: usize,

    /// Base seed of every random stream.
    pub seed: u64,

    /// Per-trial probability of the majority outcome in synthetic sequences.
    ///
    /// Default: 0.7
    pub majority_probability: f64,

    /// Trailing trials averaged into a mean response.
    ///
    /// Default: 100
    pub mean_response_window: usize,

    /// Length of synthetic outcome sequences.
    ///
    /// Default: 300
    pub n_trials: usize,

    /// Posterior rows drawn for cohort studies.
    ///
    /// Default: 10000
    pub predictive_reps: usize,

    /// Synthetic agents averaged into a mean response curve.
    ///
    /// Default: 100000
    pub curve_reps: usize,

    /// Probability mass of reported HDIs.
    ///
    /// Default: 0.95
    pub credible_mass: f64,

    /// Rows dropped from the head of each posterior sample file.
    ///
    /// Default: 0
    pub posterior_warmup: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kmax: 3,
            n_folds: 12,
            lppd_max_rows: 1000,
            seed: DEFAULT_SEED,
            majority_probability: DEFAULT_MAJORITY_PROBABILITY,
            mean_response_window: MEAN_RESPONSE_WINDOW,
            n_trials: N_TRIALS,
            predictive_reps: 10_000,
            curve_reps: 100_000,
            credible_mass: DEFAULT_CREDIBLE_MASS,
            posterior_warmup: 0,
        }
    }
}

impl Config {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Small replicate counts for smoke runs.
    pub fn quick() -> Self {
        Self {
            lppd_max_rows: 100,
            predictive_reps: 500,
            curve_reps: 2_000,
            ..Self::default()
        }
    }

    /// Large replicate counts for publication runs.
    pub fn thorough() -> Self {
        Self {
            lppd_max_rows: 4_000,
            predictive_reps: 50_000,
            curve_reps: 1_000_000,
            ..Self::default()
        }
    }

    /// Load a JSON configuration; missing fields take their defaults.
    ///
    /// The result is validated and the `MPL_SEED` override applied.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(cfg.with_env_overrides())
    }

    /// Replace the seed with `MPL_SEED` when it is set and parses.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var(SEED_ENV) {
            match value.trim().parse::<u64>() {
                Ok(seed) => {
                    tracing::debug!("Seed overridden by {}: {}", SEED_ENV, seed);
                    self.seed = seed;
                }
                Err(_) => tracing::warn!("Ignoring unparseable {}='{}'", SEED_ENV, value),
            }
        }
        self
    }

    /// Check settings deserialized from outside the builder.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(Error::Config(msg.to_string()));
        if self.kmax > KMAX {
            return fail("kmax exceeds the deepest supported memory");
        }
        if self.n_folds == 0 {
            return fail("n_folds must be positive");
        }
        if self.lppd_max_rows == 0 {
            return fail("lppd_max_rows must be positive");
        }
        if !(0.0..=1.0).contains(&self.majority_probability) {
            return fail("majority_probability must be in [0, 1]");
        }
        if self.mean_response_window == 0 {
            return fail("mean_response_window must be positive");
        }
        if self.n_trials == 0 {
            return fail("n_trials must be positive");
        }
        if self.predictive_reps == 0 || self.curve_reps == 0 {
            return fail("replicate counts must be positive");
        }
        if !(self.credible_mass > 0.0 && self.credible_mass < 1.0) {
            return fail("credible_mass must be in (0, 1)");
        }
        Ok(())
    }

    /// Set the deepest depth of the per-depth studies.
    pub fn kmax(mut self, kmax: usize) -> Self {
        assert!(kmax <= KMAX, "kmax must be at most {}", KMAX);
        self.kmax = kmax;
        self
    }

    /// Set the number of cross-validation folds.
    pub fn n_folds(mut self, n: usize) -> Self {
        assert!(n > 0, "n_folds must be positive");
        self.n_folds = n;
        self
    }

    /// Set the LPPD row cap.
    pub fn lppd_max_rows(mut self, rows: usize) -> Self {
        assert!(rows > 0, "lppd_max_rows must be positive");
        self.lppd_max_rows = rows;
        self
    }

    /// Set the base seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the majority-outcome probability of synthetic sequences.
    pub fn majority_probability(mut self, p: f64) -> Self {
        assert!((0.0..=1.0).contains(&p), "majority_probability must be in [0, 1]");
        self.majority_probability = p;
        self
    }

    /// Set the mean-response window.
    pub fn mean_response_window(mut self, window: usize) -> Self {
        assert!(window > 0, "mean_response_window must be positive");
        self.mean_response_window = window;
        self
    }

    /// Set the synthetic sequence length.
    pub fn n_trials(mut self, n: usize) -> Self {
        assert!(n > 0, "n_trials must be positive");
        self.n_trials = n;
        self
    }

    /// Set the number of posterior rows used by cohort studies.
    pub fn predictive_reps(mut self, reps: usize) -> Self {
        assert!(reps > 0, "predictive_reps must be positive");
        self.predictive_reps = reps;
        self
    }

    /// Set the number of agents per mean response curve.
    pub fn curve_reps(mut self, reps: usize) -> Self {
        assert!(reps > 0, "curve_reps must be positive");
        self.curve_reps = reps;
        self
    }

    /// Set the HDI mass.
    pub fn credible_mass(mut self, mass: f64) -> Self {
        assert!(mass > 0.0 && mass < 1.0, "credible_mass must be in (0, 1)");
        self.credible_mass = mass;
        self
    }

    /// Set the warm-up rows dropped from each posterior file.
    pub fn posterior_warmup(mut self, rows: usize) -> Self {
        self.posterior_warmup = rows;
        self
    }
}
