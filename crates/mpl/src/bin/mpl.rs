//! Command-line driver for MPL model comparison and predictive checks.
//!
//! # Usage
//!
//! ```bash
//! # Check the optimized recurrence against the reference implementation
//! mpl self-test --iterations 5000
//!
//! # Print the participants held out of each cross-validation fold
//! mpl folds --data bdata.csv
//!
//! # Cross-validated deviance from one posterior file per fold
//! mpl lppd --data bdata.csv cv-00.csv cv-01.csv ... cv-11.csv
//!
//! # Hyperparameter summaries from several chains
//! mpl --config study.json hyperparams chain1.csv chain2.csv
//!
//! # Posterior-predictive mean responses, as JSON
//! mpl --json predictive --data bdata.csv chain1.csv chain2.csv
//!
//! # Final mean response as the majority outcome becomes more likely
//! mpl sweep --trials 1000 chain1.csv chain2.csv
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;

use mpl::data::{
    load_behavioral_csv, load_posterior_chains, load_posterior_csv, BehavioralData, DataCache,
    PosteriorSample,
};
use mpl::hyperparams::hyperparameter_estimates;
use mpl::output::{format_estimates, format_row, format_summary_line, to_json_pretty, SummaryRecord};
use mpl::predictive::{
    cohort_mean_responses, depth_expectations, majority_probability_sweep, max_difference_window,
    mean_response_curve, mean_response_distribution, pattern_search, performance_grid_responses,
    ParamOverride, PATTERN_SKIP, SEARCH_PATTERNS, SWEEP_PROBABILITIES,
};
use mpl::validation::{cross_validate, Folds};
use mpl::{mpl, mpl_reference, random_outcomes, Config, Error, MplParams, Summary, KMAX};

/// MPL probability-matching model: model comparison and predictive checks
#[derive(Parser, Debug)]
#[command(name = "mpl")]
#[command(version)]
struct Args {
    /// JSON configuration file (missing fields take defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Preset used when no configuration file is given
    #[arg(long, global = true, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Override the base seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Override the warm-up rows dropped from each posterior file
    #[arg(long, global = true)]
    warmup: Option<usize>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    Quick,
    Default,
    Thorough,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare the optimized recurrence with the reference implementation
    SelfTest {
        /// Random parameter sets to check
        #[arg(long, default_value_t = 1000)]
        iterations: usize,
        /// Trials per random outcome sequence
        #[arg(long, default_value_t = 300)]
        trials: usize,
    },
    /// Show the participants held out of each cross-validation fold
    Folds {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Cross-validated deviance from one posterior sample file per fold
    Lppd {
        #[command(flatten)]
        data: DataArgs,
        /// Posterior files, in fold order
        #[arg(required = true)]
        fold_samples: Vec<PathBuf>,
    },
    /// Summaries of the population-level parameters
    Hyperparams {
        /// Posterior chain files
        #[arg(required = true)]
        samples: Vec<PathBuf>,
    },
    /// Posterior-predictive mean responses versus the observed ones
    Predictive {
        #[command(flatten)]
        data: DataArgs,
        /// Posterior chain files
        #[arg(required = true)]
        samples: Vec<PathBuf>,
    },
    /// Mean response curves, overall, per depth and for a frequency maximizer
    Curves {
        /// Posterior chain files
        #[arg(required = true)]
        samples: Vec<PathBuf>,
    },
    /// Mean responses with depth, recency and determinism forced in turn
    Grid {
        /// Posterior chain files
        #[arg(required = true)]
        samples: Vec<PathBuf>,
    },
    /// Final mean response across majority-outcome probabilities
    Sweep {
        /// Trials per synthetic outcome sequence
        #[arg(long, default_value_t = 1000)]
        trials: usize,
        /// Posterior chain files
        #[arg(required = true)]
        samples: Vec<PathBuf>,
    },
    /// Accuracy of deterministic agents on repeating outcome patterns
    Patterns,
    /// Each participant's posterior mean memory depth
    Depths {
        #[command(flatten)]
        data: DataArgs,
        /// Posterior chain files
        #[arg(required = true)]
        samples: Vec<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct DataArgs {
    /// Behavioral CSV with participant, x and y columns
    #[arg(short, long)]
    data: PathBuf,

    /// Parse the CSV directly instead of going through the JSON cache
    #[arg(long)]
    no_cache: bool,
}

impl DataArgs {
    fn load(&self) -> mpl::Result<BehavioralData> {
        if self.no_cache {
            load_behavioral_csv(&self.data)
        } else {
            DataCache::beside(&self.data).load()
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> mpl::Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => match args.preset {
            Preset::Quick => Config::quick(),
            Preset::Default => Config::new(),
            Preset::Thorough => Config::thorough(),
        }
        .with_env_overrides(),
    };
    if let Some(seed) = args.seed {
        cfg = cfg.seed(seed);
    }
    if let Some(warmup) = args.warmup {
        cfg = cfg.posterior_warmup(warmup);
    }
    tracing::debug!("Configuration: {:?}", cfg);
    Ok(cfg)
}

fn run(args: Args) -> mpl::Result<ExitCode> {
    let cfg = load_config(&args)?;
    let outcome = match &args.command {
        Command::SelfTest { iterations, trials } => {
            let passed = self_test(*iterations, *trials, &cfg, args.json)?;
            return Ok(if passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        Command::Folds { data } => folds(&data.load()?, &cfg, args.json),
        Command::Lppd { data, fold_samples } => lppd(&data.load()?, fold_samples, &cfg, args.json),
        Command::Hyperparams { samples } => hyperparams(
            &load_posterior_chains(samples.as_slice(), cfg.posterior_warmup)?,
            &cfg,
            args.json,
        ),
        Command::Predictive { data, samples } => predictive(
            &data.load()?,
            &load_posterior_chains(samples.as_slice(), cfg.posterior_warmup)?,
            &cfg,
            args.json,
        ),
        Command::Curves { samples } => curves(
            &load_posterior_chains(samples.as_slice(), cfg.posterior_warmup)?,
            &cfg,
            args.json,
        ),
        Command::Grid { samples } => grid(
            &load_posterior_chains(samples.as_slice(), cfg.posterior_warmup)?,
            &cfg,
            args.json,
        ),
        Command::Sweep { trials, samples } => {
            if *trials == 0 {
                return Err(Error::Config("--trials must be positive".to_string()));
            }
            sweep(
                &load_posterior_chains(samples.as_slice(), cfg.posterior_warmup)?,
                &cfg.clone().n_trials(*trials),
                args.json,
            )
        }
        Command::Patterns => patterns(&cfg, args.json),
        Command::Depths { data, samples } => depths(
            &data.load()?,
            &load_posterior_chains(samples.as_slice(), cfg.posterior_warmup)?,
            &cfg,
            args.json,
        ),
    };
    outcome.map(|()| ExitCode::SUCCESS)
}

fn print_json<T: Serialize>(value: &T) -> mpl::Result<()> {
    println!("{}", to_json_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct SelfTestReport {
    iterations: usize,
    trials: usize,
    max_abs_difference: f64,
    passed: bool,
}

/// Largest disagreement tolerated between the two recurrences.
const SELF_TEST_TOLERANCE: f64 = 1e-10;

/// Returns whether the recurrences agreed within tolerance.
fn self_test(iterations: usize, trials: usize, cfg: &Config, json: bool) -> mpl::Result<bool> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(cfg.seed);
    let mut max_diff = 0.0f64;
    for i in 0..iterations {
        let params = MplParams::new(
            rng.random_range(0..=KMAX),
            rng.random(),
            rng.random(),
            rng.random_range(0.0..5.0),
        );
        let outcomes = random_outcomes(trials, cfg.majority_probability, &mut rng);
        let diff = mpl(&outcomes, &params)
            .zip(mpl_reference(&outcomes, &params))
            .map(|(fast, slow)| (fast - slow).abs())
            .fold(0.0, f64::max);
        if diff > SELF_TEST_TOLERANCE {
            tracing::warn!("Iteration {}: {:?} differs by {:e}", i, params, diff);
        }
        max_diff = max_diff.max(diff);
    }

    let report = SelfTestReport {
        iterations,
        trials,
        max_abs_difference: max_diff,
        passed: max_diff <= SELF_TEST_TOLERANCE,
    };
    if json {
        print_json(&report)?;
    } else {
        println!(
            "{} parameter sets, {} trials each: max |fast - reference| = {:e}",
            iterations, trials, max_diff
        );
    }
    if !report.passed {
        tracing::warn!(
            "Recurrences disagree by {:e} (tolerance {:e})",
            max_diff,
            SELF_TEST_TOLERANCE
        );
    }
    Ok(report.passed)
}

fn folds(data: &BehavioralData, cfg: &Config, json: bool) -> mpl::Result<()> {
    let folds = Folds::new(data.len(), cfg.n_folds, cfg.seed)?;
    let held_out: Vec<Vec<&str>> = (0..folds.n_folds())
        .map(|f| {
            folds
                .held_out(f)
                .iter()
                .map(|&i| data.participants[i].id.as_str())
                .collect()
        })
        .collect();
    if json {
        return print_json(&held_out);
    }
    for (f, ids) in held_out.iter().enumerate() {
        println!("{:02}\t{}", f, ids.join(","));
    }
    Ok(())
}

fn lppd(
    data: &BehavioralData,
    fold_samples: &[PathBuf],
    cfg: &Config,
    json: bool,
) -> mpl::Result<()> {
    let folds = Folds::new(data.len(), cfg.n_folds, cfg.seed)?;
    if fold_samples.len() != folds.n_folds() {
        return Err(Error::Config(format!(
            "expected {} posterior files (one per fold), got {}",
            folds.n_folds(),
            fold_samples.len()
        )));
    }
    let report = cross_validate(data, &folds, cfg, |fold| {
        load_posterior_csv(&fold_samples[fold], cfg.posterior_warmup)
    })?;
    if json {
        return print_json(&report);
    }
    println!("fold\tlppd");
    for (f, value) in report.fold_lppds.iter().enumerate() {
        println!("{:02}\t{}", f, format_row(&[*value]));
    }
    println!("deviance\t{}", format_row(&[report.deviance]));
    Ok(())
}

fn hyperparams(samples: &[PosteriorSample], cfg: &Config, json: bool) -> mpl::Result<()> {
    let estimates = hyperparameter_estimates(samples, cfg.credible_mass);
    if json {
        let records: Vec<SummaryRecord> = estimates.iter().map(SummaryRecord::from).collect();
        return print_json(&records);
    }
    print!("{}", format_estimates(&estimates));
    Ok(())
}

#[derive(Serialize)]
struct PredictiveReport {
    by_depth: Vec<SummaryRecord>,
    overall: SummaryRecord,
    cohort_mean: SummaryRecord,
    cohort_sd: SummaryRecord,
    observed_mean: f64,
    observed_sd: f64,
    prob_mean_above_observed: f64,
    prob_sd_above_observed: f64,
    cohort_cross_correlation: SummaryRecord,
    observed_cross_correlation: f64,
    prob_cross_correlation_below_observed: f64,
}

fn predictive(
    data: &BehavioralData,
    samples: &[PosteriorSample],
    cfg: &Config,
    json: bool,
) -> mpl::Result<()> {
    let summarize = |label: String, values: &[f64]| {
        SummaryRecord::new(label, &Summary::from_samples(values, cfg.credible_mass))
    };
    let by_depth: Vec<SummaryRecord> = (0..=cfg.kmax)
        .map(|k| summarize(format!("k = {}", k), &mean_response_distribution(samples, Some(k), cfg)))
        .collect();
    let overall = summarize("any k".to_string(), &mean_response_distribution(samples, None, cfg));
    let cohort = cohort_mean_responses(samples, data, cfg);

    let report = PredictiveReport {
        by_depth,
        overall,
        cohort_mean: summarize("cohort mean".to_string(), &cohort.means),
        cohort_sd: summarize("cohort sd".to_string(), &cohort.sds),
        observed_mean: cohort.observed_mean,
        observed_sd: cohort.observed_sd,
        prob_mean_above_observed: cohort.prob_mean_above(),
        prob_sd_above_observed: cohort.prob_sd_above(),
        cohort_cross_correlation: summarize(
            "cohort cross-correlation".to_string(),
            &cohort.cross_correlations,
        ),
        observed_cross_correlation: cohort.observed_cross_correlation,
        prob_cross_correlation_below_observed: cohort.prob_cross_correlation_below(),
    };
    if json {
        return print_json(&report);
    }

    println!("quantity\tmean\tsd\tq2.5\tq97.5\thdi_lo\thdi_hi");
    for record in report
        .by_depth
        .iter()
        .chain([
            &report.overall,
            &report.cohort_mean,
            &report.cohort_sd,
            &report.cohort_cross_correlation,
        ])
    {
        println!("{}", record_line(record));
    }
    println!(
        "observed mean, sd\t{}",
        format_row(&[report.observed_mean, report.observed_sd])
    );
    println!(
        "Pr(predicted > observed) mean, sd\t{}",
        format_row(&[report.prob_mean_above_observed, report.prob_sd_above_observed])
    );
    println!(
        "observed cross-correlation\t{}",
        format_row(&[report.observed_cross_correlation])
    );
    println!(
        "Pr(predicted < observed) cross-correlation\t{}",
        format_row(&[report.prob_cross_correlation_below_observed])
    );
    Ok(())
}

fn record_line(r: &SummaryRecord) -> String {
    format_summary_line(
        &r.label,
        &Summary {
            mean: r.mean,
            sd: r.sd,
            q025: r.q025,
            q975: r.q975,
            hdi: (r.hdi_lower, r.hdi_upper),
        },
    )
}

#[derive(Serialize)]
struct CurveReport {
    label: String,
    curve: Vec<f64>,
}

#[derive(Serialize)]
struct CurvesReport {
    curves: Vec<CurveReport>,
    /// Window where depth 0 learns fastest relative to depth 2.
    fastest_window: Option<(usize, usize, f64)>,
}

fn curves(samples: &[PosteriorSample], cfg: &Config, json: bool) -> mpl::Result<()> {
    let mut overrides = vec![("any k".to_string(), ParamOverride::none())];
    overrides.extend((0..=cfg.kmax).map(|k| (format!("k = {}", k), ParamOverride::depth(k))));
    overrides.push(("maximizer".to_string(), ParamOverride::frequency_maximizer()));

    let curves: Vec<CurveReport> = overrides
        .into_iter()
        .map(|(label, over)| {
            tracing::info!("Simulating curve '{}' ({} agents)", label, cfg.curve_reps);
            CurveReport {
                curve: mean_response_curve(samples, over, cfg),
                label,
            }
        })
        .collect();

    let find = |label: &str| curves.iter().find(|c| c.label == label).map(|c| &c.curve);
    let fastest_window = match (find("k = 0"), find("k = 2")) {
        (Some(fast), Some(slow)) => {
            max_difference_window(fast, slow, cfg.mean_response_window)
        }
        _ => None,
    };

    let report = CurvesReport {
        curves,
        fastest_window,
    };
    if json {
        return print_json(&report);
    }
    for c in &report.curves {
        println!("{}\t{}", c.label, format_row(&c.curve));
    }
    if let Some((start, end, diff)) = report.fastest_window {
        println!("k = 0 vs k = 2 window\t{}\t{}\t{}", start, end, format_row(&[diff]));
    }
    Ok(())
}

#[derive(Serialize)]
struct DepthRow<'a> {
    participant: &'a str,
    expected_depth: f64,
    mean_response: f64,
}

fn depths(
    data: &BehavioralData,
    samples: &[PosteriorSample],
    cfg: &Config,
    json: bool,
) -> mpl::Result<()> {
    let expected = depth_expectations(samples, data);
    let responses = data.observed_mean_responses(cfg.mean_response_window);
    let rows: Vec<DepthRow<'_>> = data
        .participants
        .iter()
        .zip(expected.iter().zip(&responses))
        .map(|(p, (&k, &mr))| DepthRow {
            participant: &p.id,
            expected_depth: k,
            mean_response: mr,
        })
        .collect();
    if json {
        return print_json(&rows);
    }
    println!("participant\texpected_k\tmean_response");
    for row in &rows {
        println!(
            "{}\t{}",
            row.participant,
            format_row(&[row.expected_depth, row.mean_response])
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct LabelledValue<'a> {
    label: &'a str,
    value: f64,
}

fn grid(samples: &[PosteriorSample], cfg: &Config, json: bool) -> mpl::Result<()> {
    tracing::info!("Simulating 8 override curves ({} agents each)", cfg.curve_reps);
    let responses = performance_grid_responses(samples, cfg);
    if json {
        let rows: Vec<LabelledValue<'_>> = responses
            .iter()
            .map(|&(label, value)| LabelledValue { label, value })
            .collect();
        return print_json(&rows);
    }
    println!("override\tmean_response");
    for (label, mr) in &responses {
        println!("{}\t{}", label, format_row(&[*mr]));
    }
    Ok(())
}

#[derive(Serialize)]
struct SweepRow {
    majority_probability: f64,
    final_mean_response: f64,
}

fn sweep(samples: &[PosteriorSample], cfg: &Config, json: bool) -> mpl::Result<()> {
    let rows: Vec<SweepRow> = majority_probability_sweep(samples, &SWEEP_PROBABILITIES, cfg)
        .into_iter()
        .map(|(p, mr)| SweepRow {
            majority_probability: p,
            final_mean_response: mr,
        })
        .collect();
    if json {
        return print_json(&rows);
    }
    println!("p_majority\tfinal_mean_response");
    for row in &rows {
        println!(
            "{}",
            format_row(&[row.majority_probability, row.final_mean_response])
        );
    }
    Ok(())
}

fn patterns(cfg: &Config, json: bool) -> mpl::Result<()> {
    if cfg.n_trials <= PATTERN_SKIP {
        return Err(Error::Config(format!(
            "pattern search scores trials after the first {}; n_trials is {}",
            PATTERN_SKIP, cfg.n_trials
        )));
    }
    let results = pattern_search(&SEARCH_PATTERNS, cfg);
    if json {
        return print_json(&results);
    }
    println!("pattern\tk\taccuracy");
    for r in &results {
        println!("{}\t{}\t{}", r.pattern, r.depth, format_row(&[r.accuracy]));
    }
    Ok(())
}
