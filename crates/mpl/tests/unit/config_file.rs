//! Tests for JSON configuration files and the seed override.

use crate::common::temp_file;
use mpl::config::SEED_ENV;
use mpl::{Config, Error};

#[test]
fn partial_file_takes_defaults() {
    let file = temp_file(r#"{ "n_folds": 6, "credible_mass": 0.9 }"#);
    let cfg = Config::from_json_file(file.path()).unwrap();
    assert_eq!(cfg.n_folds, 6);
    assert_eq!(cfg.credible_mass, 0.9);
    assert_eq!(cfg.lppd_max_rows, Config::default().lppd_max_rows);
    assert_eq!(cfg.mean_response_window, 100);
}

#[test]
fn invalid_values_are_rejected() {
    let file = temp_file(r#"{ "credible_mass": 1.5 }"#);
    assert!(matches!(
        Config::from_json_file(file.path()),
        Err(Error::Config(_))
    ));
}

#[test]
fn malformed_json_is_json_error() {
    let file = temp_file("{ n_folds: 6 ");
    assert!(matches!(
        Config::from_json_file(file.path()),
        Err(Error::Json(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    assert!(matches!(
        Config::from_json_file(std::path::Path::new("/nonexistent/mpl.json")),
        Err(Error::Io(_))
    ));
}

#[test]
fn seed_env_override() {
    std::env::set_var(SEED_ENV, "4242");
    let overridden = Config::new().seed(1).with_env_overrides();
    std::env::set_var(SEED_ENV, "not a number");
    let ignored = Config::new().seed(1).with_env_overrides();
    std::env::remove_var(SEED_ENV);

    assert_eq!(overridden.seed, 4242);
    assert_eq!(ignored.seed, 1);
}

#[test]
fn serialized_config_round_trips() {
    let cfg = Config::thorough().seed(99).kmax(2);
    let file = temp_file(&serde_json::to_string(&cfg).unwrap());
    let back = Config::from_json_file(file.path()).unwrap();
    assert_eq!(back.kmax, 2);
    assert_eq!(back.curve_reps, cfg.curve_reps);
}
