//! Model constants used throughout the crate.

/// Default deterministic seed for RNG operations.
///
/// Same seed + same posterior rows = same synthetic agents.
/// The value `0x6D706C6D6F64` is "mplmod" encoded in ASCII.
pub const DEFAULT_SEED: u64 = 0x6D706C6D6F64;

/// Largest supported memory depth k.
///
/// The fitted hierarchical model places a categorical prior over `0..=KMAX`.
pub const KMAX: usize = 5;

/// Number of depth classes (`KMAX + 1`).
pub const N_DEPTHS: usize = KMAX + 1;

/// Logit magnitude beyond which probabilities are emitted as exactly 0 or 1.
///
/// `exp(40)` is ~2.4e17, so `e/(1+e)` already rounds to 1 in double precision.
pub const LOGIT_CLAMP: f64 = 40.0;

/// Upper bound on sampled theta. Values this large behave as argmax choice.
pub const THETA_MAX: f64 = 1e6;

/// Default credible mass for highest-density intervals.
pub const DEFAULT_CREDIBLE_MASS: f64 = 0.95;

/// Number of final trials used to compute a mean response.
pub const MEAN_RESPONSE_WINDOW: usize = 100;

/// Probability of the majority outcome in the primary experiment.
pub const DEFAULT_MAJORITY_PROBABILITY: f64 = 0.7;

/// Trials per participant in the primary dataset.
pub const N_TRIALS: usize = 300;
