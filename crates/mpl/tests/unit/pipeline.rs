//! End-to-end runs over files on disk: folds, LPPD, hyperparameters and
//! predictive studies.

use crate::common::{behavioral_csv, posterior_csv, temp_file};
use mpl::data::{load_behavioral_csv, load_posterior_csv, PosteriorSample};
use mpl::hyperparams::hyperparameter_estimates;
use mpl::output::{format_estimates, to_json_pretty, SummaryRecord};
use mpl::predictive::{
    cohort_mean_responses, depth_expectations, majority_probability_sweep, mean_response_curve,
    mean_response_distribution, performance_grid_responses, ParamOverride, SWEEP_PROBABILITIES,
};
use mpl::validation::{cross_validate, cv_deviance, Folds};
use mpl::{Config, Error};

fn cfg() -> Config {
    Config::quick()
        .n_folds(12)
        .lppd_max_rows(15)
        .n_trials(120)
        .predictive_reps(10)
        .curve_reps(500)
        .seed(2024)
}

fn fixtures() -> (mpl::data::BehavioralData, Vec<PosteriorSample>) {
    let bfile = temp_file(&behavioral_csv(24, 60));
    let pfile = temp_file(&posterior_csv(30, 24));
    (
        load_behavioral_csv(bfile.path()).unwrap(),
        load_posterior_csv(pfile.path(), 0).unwrap(),
    )
}

#[test]
fn cross_validation_over_all_folds() {
    let (data, samples) = fixtures();
    let cfg = cfg();
    let folds = Folds::new(data.len(), cfg.n_folds, cfg.seed).unwrap();

    let mut loaded = Vec::new();
    let report = cross_validate(&data, &folds, &cfg, |fold| {
        loaded.push(fold);
        Ok(samples.clone())
    })
    .unwrap();

    assert_eq!(loaded, (0..12).collect::<Vec<_>>());
    assert_eq!(report.fold_lppds.len(), 12);
    assert!(report.fold_lppds.iter().all(|l| l.is_finite() && *l < 0.0));
    assert!((report.deviance - cv_deviance(&report.fold_lppds)).abs() < 1e-9);

    let again = cross_validate(&data, &folds, &cfg, |_| Ok(samples.clone())).unwrap();
    assert_eq!(report, again);
}

#[test]
fn cross_validation_propagates_load_errors() {
    let (data, _) = fixtures();
    let cfg = cfg();
    let folds = Folds::new(data.len(), cfg.n_folds, cfg.seed).unwrap();
    let result = cross_validate(&data, &folds, &cfg, |_| {
        Err(Error::Config("missing fold file".to_string()))
    });
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn hyperparameter_report_renders() {
    let (_, samples) = fixtures();
    let estimates = hyperparameter_estimates(&samples, 0.95);
    let text = format_estimates(&estimates);
    assert!(text.starts_with("quantity\tmean"));
    assert!(text.contains("Pr(k >= 1)\t0.70"));

    let records: Vec<SummaryRecord> = estimates.iter().map(SummaryRecord::from).collect();
    let json = to_json_pretty(&records).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(estimates.len()));
}

#[test]
fn predictive_studies_produce_bounded_results() {
    let (data, samples) = fixtures();
    let cfg = cfg();

    let mrs = mean_response_distribution(&samples, Some(1), &cfg);
    assert_eq!(mrs.len(), samples.len());
    assert!(mrs.iter().all(|m| (0.0..=1.0).contains(m)));

    let cohort = cohort_mean_responses(&samples, &data, &cfg);
    assert_eq!(cohort.means.len(), 10);
    assert!((0.0..=1.0).contains(&cohort.prob_mean_above()));
    assert!((0.0..=1.0).contains(&cohort.observed_mean));

    assert_eq!(cohort.cross_correlations.len(), 10);
    assert!(cohort.cross_correlations.iter().all(|c| (-1.0..=1.0).contains(c)));
    assert!((-1.0..=1.0).contains(&cohort.observed_cross_correlation));
    assert!((0.0..=1.0).contains(&cohort.prob_cross_correlation_below()));

    let curve = mean_response_curve(&samples, ParamOverride::none(), &cfg);
    assert_eq!(curve.len(), 120);
    assert!(curve.iter().all(|p| (0.0..=1.0).contains(p)));
}

#[test]
fn override_grid_and_sweep_over_loaded_samples() {
    let (_, samples) = fixtures();
    let cfg = cfg();

    let grid = performance_grid_responses(&samples, &cfg);
    assert_eq!(grid.len(), 8);
    assert!(grid.iter().all(|(_, mr)| (0.0..=1.0).contains(mr)));

    let sweep = majority_probability_sweep(&samples, &SWEEP_PROBABILITIES, &cfg);
    let probs: Vec<f64> = sweep.iter().map(|&(p, _)| p).collect();
    assert_eq!(probs, SWEEP_PROBABILITIES.to_vec());
    // Agents track the majority outcome better as it becomes more frequent.
    assert!(sweep[5].1 > sweep[0].1, "{:?}", sweep);
}

#[test]
fn depth_expectations_per_participant() {
    let (data, samples) = fixtures();
    let depths = depth_expectations(&samples, &data);
    assert_eq!(depths.len(), data.len());
    assert!(depths.iter().all(|k| (0.0..=5.0).contains(k)));
}
