//! Posterior summaries of the population-level (hyper)parameters.
//!
//! Depth probabilities and their groupings, population medians of
//! (A, rho, theta) (the location pushed through the transforms), and the
//! correlations implied by the scale matrix.

use mpl_core::constants::N_DEPTHS;
use mpl_core::Summary;

use crate::data::PosteriorSample;

/// One summarized quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// Human-readable name, e.g. `Pr(k >= 1)`.
    pub label: String,
    /// Posterior summary over the samples.
    pub summary: Summary,
}

impl Estimate {
    fn new(label: impl Into<String>, values: &[f64], credible_mass: f64) -> Self {
        Self {
            label: label.into(),
            summary: Summary::from_samples(values, credible_mass),
        }
    }
}

/// Summaries of every hyperparameter of interest, in reporting order.
///
/// # Panics
///
/// Panics if `samples` is empty or `credible_mass` is outside (0, 1).
pub fn hyperparameter_estimates(samples: &[PosteriorSample], credible_mass: f64) -> Vec<Estimate> {
    assert!(!samples.is_empty(), "Cannot summarize an empty posterior");

    let column = |f: &dyn Fn(&PosteriorSample) -> f64| -> Vec<f64> { samples.iter().map(f).collect() };
    let mut estimates = Vec::with_capacity(N_DEPTHS + 9);

    for k in 0..N_DEPTHS {
        let probs = column(&|s| s.row.class_probs()[k]);
        estimates.push(Estimate::new(format!("Pr(k = {})", k), &probs, credible_mass));
    }
    let grouped: [(&str, &dyn Fn(&[f64; N_DEPTHS]) -> f64); 3] = [
        ("Pr(k = 1 or k = 2)", &|p| p[1] + p[2]),
        ("Pr(k >= 1)", &|p| p[1..].iter().sum()),
        ("Pr(k >= 3)", &|p| p[3..].iter().sum()),
    ];
    for (label, f) in grouped {
        let values = column(&|s| f(s.row.class_probs()));
        estimates.push(Estimate::new(label, &values, credible_mass));
    }

    let medians: Vec<_> = samples.iter().map(|s| s.row.medians()).collect();
    let a: Vec<f64> = medians.iter().map(|m| m.a).collect();
    let rho: Vec<f64> = medians.iter().map(|m| m.rho).collect();
    let theta: Vec<f64> = medians.iter().map(|m| m.theta).collect();
    estimates.push(Estimate::new("A", &a, credible_mass));
    estimates.push(Estimate::new("rho", &rho, credible_mass));
    estimates.push(Estimate::new("theta", &theta, credible_mass));

    let correlations: Vec<(f64, f64, f64)> =
        samples.iter().map(|s| s.row.correlations()).collect();
    let pick = |f: fn(&(f64, f64, f64)) -> f64| -> Vec<f64> { correlations.iter().map(f).collect() };
    estimates.push(Estimate::new("cor(A, rho)", &pick(|c| c.0), credible_mass));
    estimates.push(Estimate::new("cor(A, theta)", &pick(|c| c.1), credible_mass));
    estimates.push(Estimate::new("cor(rho, theta)", &pick(|c| c.2), credible_mass));

    estimates
}
