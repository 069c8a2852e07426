//! Posterior-predictive sampling of MPL parameters.
//!
//! A posterior row of the hierarchical model describes the population as a
//! two-stage generative process:
//!
//! 1. A memory depth `k ~ Categorical(π)` over `0..=KMAX`.
//! 2. Independently, an untransformed vector `z ~ t_ν(μ, Σ)` that maps to the
//!    continuous parameters through `A = expit(z_1)`, `rho = expit(z_2)`,
//!    `theta = min(exp(z_3), THETA_MAX)`.
//!
//! The multivariate t is drawn as a normal-variance mixture:
//!
//! ```text
//! Y ~ N(0, Σ),  U ~ χ²(ν),  z = μ + Y * sqrt(ν / U)
//! ```
//!
//! Both stages are exposed separately so callers can fix one and randomize
//! the other.

use core::fmt;
use core::iter::FusedIterator;

use nalgebra::Cholesky;
use rand::Rng;
use rand_distr::{ChiSquared, Distribution, StandardNormal};

use crate::constants::{N_DEPTHS, THETA_MAX};
use crate::math;
use crate::types::{ClassProbabilities, ContinuousParams, Matrix3, MplParams, Vector3};

/// Tolerance on the sum of class probabilities. Sampler CSV output carries
/// six significant digits, so rounding alone can move the sum by a few 1e-6.
const CLASS_SUM_TOLERANCE: f64 = 1e-4;

/// Errors raised when building a [`PosteriorRow`].
#[derive(Debug, Clone, PartialEq)]
pub enum PosteriorError {
    /// A class probability is negative or not finite.
    InvalidClassProbability {
        /// Depth whose probability is invalid.
        depth: usize,
        /// The offending value.
        value: f64,
    },

    /// Class probabilities do not sum to 1.
    ClassProbabilitiesNotNormalized {
        /// Actual sum.
        sum: f64,
    },

    /// Degrees of freedom must be positive and finite.
    InvalidDegreesOfFreedom(f64),

    /// Location vector contains a non-finite entry.
    NonFiniteLocation,

    /// Scale matrix is not symmetric positive definite.
    ScaleNotPositiveDefinite,
}

impl fmt::Display for PosteriorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PosteriorError::InvalidClassProbability { depth, value } => {
                write!(f, "invalid probability {} for depth {}", value, depth)
            }
            PosteriorError::ClassProbabilitiesNotNormalized { sum } => {
                write!(f, "class probabilities sum to {}, expected 1", sum)
            }
            PosteriorError::InvalidDegreesOfFreedom(nu) => {
                write!(f, "degrees of freedom must be positive, got {}", nu)
            }
            PosteriorError::NonFiniteLocation => write!(f, "location vector is not finite"),
            PosteriorError::ScaleNotPositiveDefinite => {
                write!(f, "scale matrix is not symmetric positive definite")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PosteriorError {}

/// Stage 1: pick a depth from a single uniform draw `u` in [0, 1).
///
/// Returns the first class whose cumulative probability exceeds `u`. If
/// rounding leaves the cumulative sum short of `u`, the last class is
/// returned.
pub fn sample_depth(class_probs: &ClassProbabilities, u: f64) -> usize {
    let mut cumulative = 0.0;
    for (k, &p) in class_probs.iter().enumerate() {
        cumulative += p;
        if u < cumulative {
            return k;
        }
    }
    N_DEPTHS - 1
}

/// One fitted row of the hierarchical MPL posterior.
///
/// Validated on construction; the Cholesky factor of the scale matrix and the
/// χ² mixing distribution are prepared once and reused by every draw.
#[derive(Debug, Clone)]
pub struct PosteriorRow {
    class_probs: ClassProbabilities,
    mu: Vector3,
    nu: f64,
    sigma: Matrix3,
    /// Lower Cholesky factor L of Σ (Σ = L Lᵀ).
    scale_factor: Matrix3,
    mixing: ChiSquared<f64>,
}

impl PosteriorRow {
    /// Build a posterior row.
    ///
    /// # Arguments
    ///
    /// * `class_probs` - Probability of each depth `0..=KMAX`
    /// * `mu` - Location of the untransformed (A, rho, theta) vector
    /// * `nu` - Degrees of freedom of the multivariate t
    /// * `sigma` - Scale matrix of the multivariate t
    pub fn new(
        class_probs: ClassProbabilities,
        mu: Vector3,
        nu: f64,
        sigma: Matrix3,
    ) -> Result<Self, PosteriorError> {
        for (depth, &value) in class_probs.iter().enumerate() {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(PosteriorError::InvalidClassProbability { depth, value });
            }
        }
        let sum: f64 = class_probs.iter().sum();
        if math::abs(sum - 1.0) > CLASS_SUM_TOLERANCE {
            return Err(PosteriorError::ClassProbabilitiesNotNormalized { sum });
        }
        if !(nu > 0.0 && nu.is_finite()) {
            return Err(PosteriorError::InvalidDegreesOfFreedom(nu));
        }
        if mu.iter().any(|v| !v.is_finite()) {
            return Err(PosteriorError::NonFiniteLocation);
        }
        if sigma.iter().any(|v| !v.is_finite()) || (sigma - sigma.transpose()).amax() > 1e-9 {
            return Err(PosteriorError::ScaleNotPositiveDefinite);
        }
        let scale_factor = Cholesky::new(sigma)
            .ok_or(PosteriorError::ScaleNotPositiveDefinite)?
            .unpack();
        let mixing =
            ChiSquared::new(nu).map_err(|_| PosteriorError::InvalidDegreesOfFreedom(nu))?;

        Ok(Self {
            class_probs,
            mu,
            nu,
            sigma,
            scale_factor,
            mixing,
        })
    }

    /// Probability of each memory depth.
    pub fn class_probs(&self) -> &ClassProbabilities {
        &self.class_probs
    }

    /// Location of the untransformed parameter vector.
    pub fn mu(&self) -> &Vector3 {
        &self.mu
    }

    /// Degrees of freedom.
    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// Scale matrix.
    pub fn sigma(&self) -> &Matrix3 {
        &self.sigma
    }

    /// Population medians of (A, rho, theta): the location pushed through
    /// the transforms, with theta capped like sampled values.
    pub fn medians(&self) -> ContinuousParams {
        transform(&self.mu)
    }

    /// Pairwise correlations implied by the scale matrix:
    /// `(A–rho, A–theta, rho–theta)`.
    pub fn correlations(&self) -> (f64, f64, f64) {
        let s = &self.sigma;
        let corr = |i: usize, j: usize| s[(i, j)] / math::sqrt(s[(i, i)] * s[(j, j)]);
        (corr(0, 1), corr(0, 2), corr(1, 2))
    }

    /// Stage 1: draw a memory depth.
    pub fn draw_depth<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let u: f64 = rng.random();
        sample_depth(&self.class_probs, u)
    }

    /// Draw the untransformed vector `z ~ t_ν(μ, Σ)`.
    pub fn draw_raw<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector3 {
        let z = Vector3::from_fn(|_, _| StandardNormal.sample(&mut *rng));
        let y = self.scale_factor * z;
        let u = self.mixing.sample(rng);
        self.mu + y * math::sqrt(self.nu / u)
    }

    /// Stage 2: draw continuous parameters, independent of the depth.
    pub fn draw_continuous<R: Rng + ?Sized>(&self, rng: &mut R) -> ContinuousParams {
        transform(&self.draw_raw(rng))
    }

    /// Draw one full parameter tuple (one synthetic agent).
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> MplParams {
        let k = self.draw_depth(rng);
        self.draw_continuous(rng).with_depth(k)
    }
}

/// Map an untransformed vector onto (A, rho, theta).
fn transform(z: &Vector3) -> ContinuousParams {
    let theta = math::exp(z[2]).min(THETA_MAX);
    ContinuousParams {
        a: math::expit(z[0]),
        rho: math::expit(z[1]),
        theta,
    }
}

/// Lazy stream of independent parameter draws from one posterior row.
#[derive(Debug)]
pub struct ParameterDraws<'a, R: Rng + ?Sized> {
    row: &'a PosteriorRow,
    remaining: usize,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Iterator for ParameterDraws<'_, R> {
    type Item = MplParams;

    fn next(&mut self) -> Option<MplParams> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.row.draw(&mut *self.rng))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<R: Rng + ?Sized> ExactSizeIterator for ParameterDraws<'_, R> {}
impl<R: Rng + ?Sized> FusedIterator for ParameterDraws<'_, R> {}

/// Draw `size` independent synthetic agents from a posterior row.
///
/// # Example
///
/// ```
/// use mpl_core::{sample_parameters, Matrix3, PosteriorRow, Vector3};
/// use rand::SeedableRng;
/// use rand_xoshiro::Xoshiro256PlusPlus;
///
/// let row = PosteriorRow::new(
///     [0.5, 0.5, 0.0, 0.0, 0.0, 0.0],
///     Vector3::new(1.0, 0.0, 0.5),
///     5.0,
///     Matrix3::identity(),
/// )
/// .unwrap();
/// let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
/// let agents: Vec<_> = sample_parameters(&row, 10, &mut rng).collect();
/// assert_eq!(agents.len(), 10);
/// ```
pub fn sample_parameters<'a, R: Rng + ?Sized>(
    row: &'a PosteriorRow,
    size: usize,
    rng: &'a mut R,
) -> ParameterDraws<'a, R> {
    ParameterDraws {
        row,
        remaining: size,
        rng,
    }
}
