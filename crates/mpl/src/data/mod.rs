//! Loading behavioral data and posterior samples.
//!
//! # Supported Formats
//!
//! - **Behavioral CSV**: header with `participant`, `x` and `y` columns in any
//!   order. `x` is the trial's majority-outcome indicator, `y` the
//!   participant's choice. Rows are grouped by participant in order of first
//!   appearance.
//! - **Posterior CSV**: sampler output with `#` comment lines and columns
//!   `probk.1..probk.6`, `mu.1..mu.3`, `nu`, `sigma.i.j`. Per-participant
//!   columns `A.i`, `rho.i`, `theta.i` are read when present. Other columns
//!   are ignored.
//!
//! # Example
//!
//! ```ignore
//! use mpl::data::{load_behavioral_csv, load_posterior_chains};
//! use std::path::Path;
//!
//! let data = load_behavioral_csv(Path::new("bdata.csv"))?;
//! let samples = load_posterior_chains(&["chain1.csv", "chain2.csv"], 1000)?;
//! println!("{} participants, {} posterior rows", data.len(), samples.len());
//! ```

mod cache;
mod csv;

pub use cache::DataCache;
pub use csv::{load_behavioral_csv, load_posterior_chains, load_posterior_csv};

use serde::{Deserialize, Serialize};

use mpl_core::{
    cross_correlation, mean_response, ChoiceSequence, ContinuousParams, PosteriorRow,
};

use crate::error::{Error, Result};

/// One participant's outcome and choice sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    /// Identifier from the `participant` column.
    pub id: String,
    /// Outcomes (`x`) and choices (`y`).
    pub sequence: ChoiceSequence,
}

/// All participants of an experiment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BehavioralData {
    /// Participants in order of first appearance in the source file.
    pub participants: Vec<Participant>,
}

impl BehavioralData {
    /// Number of participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether there are no participants.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Total number of trials over all participants.
    pub fn n_trials(&self) -> usize {
        self.participants.iter().map(|p| p.sequence.len()).sum()
    }

    /// Sequences in participant order.
    pub fn sequences(&self) -> impl ExactSizeIterator<Item = &ChoiceSequence> {
        self.participants.iter().map(|p| &p.sequence)
    }

    /// Each participant's mean choice over the final `window` trials.
    ///
    /// Participants without trials are reported as 0.
    pub fn observed_mean_responses(&self, window: usize) -> Vec<f64> {
        self.sequences()
            .map(|seq| {
                if seq.is_empty() {
                    0.0
                } else {
                    mean_response(seq.choices(), window)
                }
            })
            .collect()
    }

    /// Each participant's lag-one cross-correlation between the previous
    /// outcome and the current choice over the final `window` trials.
    ///
    /// Participants with fewer than two trials are reported as 0.
    pub fn observed_cross_correlations(&self, window: usize) -> Vec<f64> {
        self.sequences()
            .map(|seq| {
                if seq.len() < 2 {
                    0.0
                } else {
                    cross_correlation(seq.outcomes(), seq.choices(), window)
                }
            })
            .collect()
    }
}

/// Serialized form used by [`DataCache`].
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoredParticipant {
    id: String,
    x: Vec<u8>,
    y: Vec<u8>,
}

impl BehavioralData {
    pub(crate) fn to_stored(&self) -> Vec<StoredParticipant> {
        self.participants
            .iter()
            .map(|p| StoredParticipant {
                id: p.id.clone(),
                x: p.sequence.outcomes().to_vec(),
                y: p.sequence.choices().to_vec(),
            })
            .collect()
    }

    pub(crate) fn from_stored(stored: Vec<StoredParticipant>) -> Result<Self> {
        let participants = stored
            .into_iter()
            .map(|s| {
                let sequence = ChoiceSequence::new(s.x, s.y).map_err(|source| Error::Sequence {
                    participant: s.id.clone(),
                    source,
                })?;
                Ok(Participant { id: s.id, sequence })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { participants })
    }
}

/// One posterior draw: the population-level row plus, when the sampler
/// recorded them, each participant's continuous parameters.
#[derive(Debug, Clone)]
pub struct PosteriorSample {
    /// Population-level parameters.
    pub row: PosteriorRow,
    /// Per-participant (A, rho, theta), indexed like the fitted data set.
    pub subjects: Vec<ContinuousParams>,
}

impl PosteriorSample {
    /// Sample without per-participant parameters.
    pub fn new(row: PosteriorRow) -> Self {
        Self {
            row,
            subjects: Vec::new(),
        }
    }

    /// Continuous parameters for participant `index`; the population
    /// medians when the sampler did not record that participant.
    pub fn subject_params(&self, index: usize) -> ContinuousParams {
        self.subjects
            .get(index)
            .copied()
            .unwrap_or_else(|| self.row.medians())
    }
}
