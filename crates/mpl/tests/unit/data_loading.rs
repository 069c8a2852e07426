//! Tests for the behavioral and posterior CSV loaders.

use crate::common::{behavioral_csv, posterior_csv, posterior_header, posterior_line, temp_file};
use mpl::data::{load_behavioral_csv, load_posterior_chains, load_posterior_csv};
use mpl::Error;

// =============================================================================
// BEHAVIORAL DATA
// =============================================================================

#[test]
fn behavioral_groups_by_participant_in_first_appearance_order() {
    let file = temp_file("participant,x,y\nb,1,0\na,0,0\nb,1,1\na,1,1\n");
    let data = load_behavioral_csv(file.path()).unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data.participants[0].id, "b");
    assert_eq!(data.participants[0].sequence.outcomes(), &[1, 1]);
    assert_eq!(data.participants[0].sequence.choices(), &[0, 1]);
    assert_eq!(data.participants[1].id, "a");
    assert_eq!(data.participants[1].sequence.outcomes(), &[0, 1]);
}

#[test]
fn behavioral_columns_in_any_order() {
    let file = temp_file("y,session,x,participant\n1,3,0,p1\n0,3,1,p1\n");
    let data = load_behavioral_csv(file.path()).unwrap();
    assert_eq!(data.participants[0].sequence.outcomes(), &[0, 1]);
    assert_eq!(data.participants[0].sequence.choices(), &[1, 0]);
}

#[test]
fn behavioral_generated_fixture() {
    let file = temp_file(&behavioral_csv(24, 300));
    let data = load_behavioral_csv(file.path()).unwrap();
    assert_eq!(data.len(), 24);
    assert_eq!(data.n_trials(), 24 * 300);
}

#[test]
fn behavioral_missing_column() {
    let file = temp_file("participant,x\np,1\n");
    match load_behavioral_csv(file.path()) {
        Err(Error::MissingColumn { column, .. }) => assert_eq!(column, "y"),
        other => panic!("expected MissingColumn, got {:?}", other),
    }
}

#[test]
fn behavioral_invalid_value_reports_line() {
    let file = temp_file("participant,x,y\np,1,0\np,1,yes\n");
    match load_behavioral_csv(file.path()) {
        Err(Error::InvalidValue { line, column, value }) => {
            assert_eq!(line, 3);
            assert_eq!(column, "y");
            assert_eq!(value, "yes");
        }
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn behavioral_short_row_is_parse_error() {
    let file = temp_file("participant,x,y\np,1\n");
    assert!(matches!(
        load_behavioral_csv(file.path()),
        Err(Error::Parse { line: 2, .. })
    ));
}

#[test]
fn behavioral_non_binary_is_sequence_error() {
    let file = temp_file("participant,x,y\np,2,0\n");
    match load_behavioral_csv(file.path()) {
        Err(Error::Sequence { participant, .. }) => assert_eq!(participant, "p"),
        other => panic!("expected Sequence error, got {:?}", other),
    }
}

#[test]
fn behavioral_header_only_is_empty() {
    let file = temp_file("participant,x,y\n\n");
    assert!(matches!(
        load_behavioral_csv(file.path()),
        Err(Error::EmptyData(_))
    ));
}

// =============================================================================
// POSTERIOR SAMPLES
// =============================================================================

#[test]
fn posterior_skips_comments_and_warmup() {
    let file = temp_file(&posterior_csv(10, 0));
    assert_eq!(load_posterior_csv(file.path(), 0).unwrap().len(), 10);
    assert_eq!(load_posterior_csv(file.path(), 4).unwrap().len(), 6);
    assert!(load_posterior_csv(file.path(), 50).unwrap().is_empty());
}

#[test]
fn posterior_reads_row_values() {
    let file = temp_file(&posterior_csv(2, 0));
    let samples = load_posterior_csv(file.path(), 1).unwrap();
    let row = &samples[0].row;
    assert_eq!(row.class_probs(), &[0.2, 0.2, 0.2, 0.2, 0.1, 0.1]);
    assert!((row.mu()[0] - 1.01).abs() < 1e-12);
    assert_eq!(row.nu(), 8.0);
    assert_eq!(row.sigma()[(0, 1)], 0.1);
    assert_eq!(row.sigma()[(2, 2)], 0.3);
    assert!(samples[0].subjects.is_empty());
}

#[test]
fn posterior_reads_subject_parameters() {
    let file = temp_file(&posterior_csv(3, 2));
    let samples = load_posterior_csv(file.path(), 0).unwrap();
    assert_eq!(samples[0].subjects.len(), 2);
    let p = samples[0].subject_params(1);
    assert_eq!((p.a, p.rho, p.theta), (0.8, 0.6, 2.5));
    // Unrecorded participants fall back to the population medians.
    assert_eq!(samples[0].subject_params(7), samples[0].row.medians());
}

#[test]
fn posterior_missing_column() {
    let header = posterior_header(0).replace(",nu,", ",df,");
    let body = posterior_line([1.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0.0, 0);
    let file = temp_file(&format!("{}\n{}\n", header, body));
    match load_posterior_csv(file.path(), 0) {
        Err(Error::MissingColumn { column, .. }) => assert_eq!(column, "nu"),
        other => panic!("expected MissingColumn, got {:?}", other.map(|s| s.len())),
    }
}

#[test]
fn posterior_invalid_row_reports_line() {
    // Class probabilities summing to 0.5.
    let body = posterior_line([0.5, 0.0, 0.0, 0.0, 0.0, 0.0], 0.0, 0);
    let file = temp_file(&format!("# comment\n{}\n{}\n", posterior_header(0), body));
    match load_posterior_csv(file.path(), 0) {
        Err(Error::Posterior { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected Posterior error, got {:?}", other.map(|s| s.len())),
    }
}

#[test]
fn posterior_subject_out_of_range() {
    let line = posterior_line([1.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0.0, 1)
        .replace(",0.8,0.6,", ",1.8,0.6,");
    let file = temp_file(&format!("{}\n{}\n", posterior_header(1), line));
    match load_posterior_csv(file.path(), 0) {
        Err(Error::InvalidValue { column, .. }) => assert_eq!(column, "A.1"),
        other => panic!("expected InvalidValue, got {:?}", other.map(|s| s.len())),
    }
}

#[test]
fn chains_concatenate_in_order() {
    let first = temp_file(&posterior_csv(5, 0));
    let second = temp_file(&posterior_csv(3, 0));
    let all = load_posterior_chains(&[first.path(), second.path()], 1).unwrap();
    assert_eq!(all.len(), 4 + 2);
    // Second chain's first kept row is its row 1 (shift 0.01).
    assert!((all[4].row.mu()[0] - 1.01).abs() < 1e-12);
}

#[test]
fn chains_all_warmup_is_empty() {
    let file = temp_file(&posterior_csv(2, 0));
    assert!(matches!(
        load_posterior_chains(&[file.path()], 2),
        Err(Error::EmptyData(_))
    ));
}
