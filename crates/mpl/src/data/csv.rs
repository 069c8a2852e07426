//! CSV parsing for behavioral data and posterior samples.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use mpl_core::constants::N_DEPTHS;
use mpl_core::{ChoiceSequence, ContinuousParams, Matrix3, PosteriorRow, Vector3};

use super::{BehavioralData, Participant, PosteriorSample};
use crate::error::{Error, Result};

/// Column lookup built from a header line.
struct Header {
    names: Vec<String>,
    index: HashMap<String, usize>,
    path: PathBuf,
}

impl Header {
    fn parse(line: &str, path: &Path) -> Self {
        let names: Vec<String> = line.split(',').map(|s| s.trim().to_string()).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names,
            index,
            path: path.to_path_buf(),
        }
    }

    fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.get(name).ok_or_else(|| Error::MissingColumn {
            column: name.to_string(),
            path: self.path.clone(),
        })
    }
}

/// Fields of one data line, with the line number for error reporting.
struct Record<'a> {
    fields: Vec<&'a str>,
    line: usize,
}

impl<'a> Record<'a> {
    fn parse(text: &'a str, line: usize, header: &Header) -> Result<Self> {
        let fields: Vec<&str> = text.split(',').map(str::trim).collect();
        if fields.len() < header.names.len() {
            return Err(Error::Parse {
                line,
                message: format!(
                    "Expected {} columns, got {}",
                    header.names.len(),
                    fields.len()
                ),
            });
        }
        Ok(Self { fields, line })
    }

    fn value<T: std::str::FromStr>(&self, header: &Header, idx: usize) -> Result<T> {
        let raw = self.fields[idx];
        raw.parse().map_err(|_| Error::InvalidValue {
            line: self.line,
            column: header.names[idx].clone(),
            value: raw.to_string(),
        })
    }
}

/// Load behavioral data from a CSV with `participant`, `x` and `y` columns.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a column is missing, a
/// field does not parse, a participant's values are not binary, or the file
/// holds no data rows.
pub fn load_behavioral_csv(path: &Path) -> Result<BehavioralData> {
    let reader = BufReader::new(File::open(path)?);

    let mut header: Option<Header> = None;
    let mut columns = (0, 0, 0);
    let mut groups: Vec<(String, Vec<u8>, Vec<u8>)> = Vec::new();
    let mut group_of: HashMap<String, usize> = HashMap::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(h) = header.as_ref() else {
            let h = Header::parse(line, path);
            columns = (h.require("participant")?, h.require("x")?, h.require("y")?);
            header = Some(h);
            continue;
        };

        let record = Record::parse(line, line_num + 1, h)?;
        let (id_col, x_col, y_col) = columns;
        let id = record.fields[id_col];
        let x: u8 = record.value(h, x_col)?;
        let y: u8 = record.value(h, y_col)?;

        let group = match group_of.get(id) {
            Some(&g) => g,
            None => {
                group_of.insert(id.to_string(), groups.len());
                groups.push((id.to_string(), Vec::new(), Vec::new()));
                groups.len() - 1
            }
        };
        groups[group].1.push(x);
        groups[group].2.push(y);
    }

    if groups.is_empty() {
        return Err(Error::EmptyData(path.to_path_buf()));
    }

    let participants = groups
        .into_iter()
        .map(|(id, xs, ys)| {
            let sequence = ChoiceSequence::new(xs, ys).map_err(|source| Error::Sequence {
                participant: id.clone(),
                source,
            })?;
            Ok(Participant { id, sequence })
        })
        .collect::<Result<Vec<_>>>()?;

    let data = BehavioralData { participants };
    tracing::debug!(
        "Loaded {} participants ({} trials) from {}",
        data.len(),
        data.n_trials(),
        path.display()
    );
    Ok(data)
}

/// Column positions of the posterior quantities.
struct PosteriorColumns {
    probk: [usize; N_DEPTHS],
    mu: [usize; 3],
    nu: usize,
    sigma: [[usize; 3]; 3],
    subjects: Vec<[usize; 3]>,
}

impl PosteriorColumns {
    fn locate(header: &Header) -> Result<Self> {
        let mut probk = [0; N_DEPTHS];
        for (k, slot) in probk.iter_mut().enumerate() {
            *slot = header.require(&format!("probk.{}", k + 1))?;
        }
        let mut mu = [0; 3];
        for (i, slot) in mu.iter_mut().enumerate() {
            *slot = header.require(&format!("mu.{}", i + 1))?;
        }
        let nu = header.require("nu")?;
        let mut sigma = [[0; 3]; 3];
        for (i, row) in sigma.iter_mut().enumerate() {
            for (j, slot) in row.iter_mut().enumerate() {
                *slot = header.require(&format!("sigma.{}.{}", i + 1, j + 1))?;
            }
        }

        // Participants are numbered from 1 with no gaps.
        let mut subjects = Vec::new();
        while let Some(a) = header.get(&format!("A.{}", subjects.len() + 1)) {
            let n = subjects.len() + 1;
            let rho = header.require(&format!("rho.{}", n))?;
            let theta = header.require(&format!("theta.{}", n))?;
            subjects.push([a, rho, theta]);
        }

        Ok(Self {
            probk,
            mu,
            nu,
            sigma,
            subjects,
        })
    }

    fn read(&self, record: &Record<'_>, header: &Header) -> Result<PosteriorSample> {
        let mut class_probs = [0.0; N_DEPTHS];
        for (p, &idx) in class_probs.iter_mut().zip(&self.probk) {
            *p = record.value(header, idx)?;
        }
        let mut mu = [0.0; 3];
        for (m, &idx) in mu.iter_mut().zip(&self.mu) {
            *m = record.value(header, idx)?;
        }
        let nu: f64 = record.value(header, self.nu)?;
        let mut sigma = [[0.0; 3]; 3];
        for (row, idx_row) in sigma.iter_mut().zip(&self.sigma) {
            for (s, &idx) in row.iter_mut().zip(idx_row) {
                *s = record.value(header, idx)?;
            }
        }

        let row = PosteriorRow::new(
            class_probs,
            Vector3::from(mu),
            nu,
            Matrix3::from_fn(|i, j| sigma[i][j]),
        )
        .map_err(|source| Error::Posterior {
            line: record.line,
            source,
        })?;

        let subjects = self
            .subjects
            .iter()
            .map(|&[a, rho, theta]| read_subject(record, header, a, rho, theta))
            .collect::<Result<Vec<_>>>()?;

        Ok(PosteriorSample { row, subjects })
    }
}

fn read_subject(
    record: &Record<'_>,
    header: &Header,
    a_idx: usize,
    rho_idx: usize,
    theta_idx: usize,
) -> Result<ContinuousParams> {
    let unit = |idx: usize| -> Result<f64> {
        let v: f64 = record.value(header, idx)?;
        if (0.0..=1.0).contains(&v) {
            Ok(v)
        } else {
            Err(invalid(record, header, idx))
        }
    };
    let a = unit(a_idx)?;
    let rho = unit(rho_idx)?;
    let theta: f64 = record.value(header, theta_idx)?;
    if !(theta >= 0.0 && theta.is_finite()) {
        return Err(invalid(record, header, theta_idx));
    }
    Ok(ContinuousParams::new(a, rho, theta))
}

fn invalid(record: &Record<'_>, header: &Header, idx: usize) -> Error {
    Error::InvalidValue {
        line: record.line,
        column: header.names[idx].clone(),
        value: record.fields[idx].to_string(),
    }
}

/// Load posterior samples from one sampler output file.
///
/// Lines starting with `#` are comments. The first `warmup` data rows are
/// dropped.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is
/// missing, a field does not parse, or a row fails posterior validation.
pub fn load_posterior_csv(path: &Path, warmup: usize) -> Result<Vec<PosteriorSample>> {
    let reader = BufReader::new(File::open(path)?);

    let mut layout: Option<(Header, PosteriorColumns)> = None;
    let mut data_rows = 0usize;
    let mut samples = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((header, columns)) = layout.as_ref() else {
            let header = Header::parse(line, path);
            let columns = PosteriorColumns::locate(&header)?;
            layout = Some((header, columns));
            continue;
        };

        data_rows += 1;
        if data_rows <= warmup {
            continue;
        }
        let record = Record::parse(line, line_num + 1, header)?;
        samples.push(columns.read(&record, header)?);
    }

    tracing::info!(
        "Loaded {} posterior rows from {} ({} warm-up rows dropped)",
        samples.len(),
        path.display(),
        data_rows.min(warmup)
    );
    Ok(samples)
}

/// Load and concatenate several chains in the order given.
///
/// # Errors
///
/// Returns an error if any file fails to load, no paths are given, or no
/// rows remain after warm-up.
pub fn load_posterior_chains<P: AsRef<Path>>(
    paths: &[P],
    warmup: usize,
) -> Result<Vec<PosteriorSample>> {
    let Some(first) = paths.first() else {
        return Err(Error::Config("no posterior sample files given".to_string()));
    };

    let mut all = Vec::new();
    for path in paths {
        all.extend(load_posterior_csv(path.as_ref(), warmup)?);
    }
    if all.is_empty() {
        return Err(Error::EmptyData(first.as_ref().to_path_buf()));
    }
    Ok(all)
}
