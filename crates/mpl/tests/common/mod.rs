//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Write `contents` to a fresh temporary file.
pub fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Behavioral CSV for `n` participants of `trials` trials each.
///
/// Outcomes follow a fixed pattern; participant `i` copies the outcome on
/// most trials and deviates every `(i % 4) + 3` trials.
pub fn behavioral_csv(n: usize, trials: usize) -> String {
    let mut out = String::from("participant,x,y\n");
    for i in 0..n {
        for t in 0..trials {
            let x = u8::from(t % 10 < 7);
            let y = if t % ((i % 4) + 3) == 0 { 1 - x } else { x };
            out.push_str(&format!("s{:03},{},{}\n", i, x, y));
        }
    }
    out
}

/// Posterior CSV header in sampler column order, with `subjects`
/// per-participant parameter triples.
pub fn posterior_header(subjects: usize) -> String {
    let mut cols = vec!["lp__".to_string()];
    cols.extend((1..=6).map(|k| format!("probk.{}", k)));
    cols.extend((1..=3).map(|i| format!("mu.{}", i)));
    cols.push("nu".to_string());
    for i in 1..=3 {
        for j in 1..=3 {
            cols.push(format!("sigma.{}.{}", i, j));
        }
    }
    for s in 1..=subjects {
        cols.push(format!("A.{}", s));
        cols.push(format!("rho.{}", s));
        cols.push(format!("theta.{}", s));
    }
    cols.join(",")
}

/// One posterior data line. `shift` perturbs the location so rows differ.
pub fn posterior_line(probk: [f64; 6], shift: f64, subjects: usize) -> String {
    let mut vals = vec![-1234.5];
    vals.extend(probk);
    vals.extend([1.0 + shift, 0.5, 1.0]);
    vals.push(8.0);
    vals.extend([0.5, 0.1, 0.0, 0.1, 0.5, 0.0, 0.0, 0.0, 0.3]);
    for _ in 0..subjects {
        vals.extend([0.8, 0.6, 2.5]);
    }
    vals.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Sampler-style file: comment preamble, header, `rows` data lines, and an
/// adaptation comment after the first data line.
pub fn posterior_csv(rows: usize, subjects: usize) -> String {
    let mut out = String::from("# model = mpl\n# method = sample (Default)\n");
    out.push_str(&posterior_header(subjects));
    out.push('\n');
    for r in 0..rows {
        let probk = if r % 2 == 0 {
            [0.4, 0.3, 0.2, 0.05, 0.03, 0.02]
        } else {
            [0.2, 0.2, 0.2, 0.2, 0.1, 0.1]
        };
        out.push_str(&posterior_line(probk, r as f64 * 0.01, subjects));
        out.push('\n');
        if r == 0 {
            out.push_str("# Adaptation terminated\n");
        }
    }
    out
}

/// Read a file to a string.
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
