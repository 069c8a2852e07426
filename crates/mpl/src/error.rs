//! Error type for data loading, configuration and orchestration.

use std::path::PathBuf;

use mpl_core::{PosteriorError, SequenceError};

/// Errors raised by the `mpl` crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error reading or writing a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV line.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Description of the parse error.
        message: String,
    },

    /// A field that does not parse as the expected number.
    #[error("Invalid value in column '{column}' at line {line}: '{value}'")]
    InvalidValue {
        /// Line number where the invalid value was found (1-indexed).
        line: usize,
        /// Column header.
        column: String,
        /// The invalid field text.
        value: String,
    },

    /// A required column is absent from the header.
    #[error("Missing column '{column}' in {}", .path.display())]
    MissingColumn {
        /// Expected column header.
        column: String,
        /// File that was being read.
        path: PathBuf,
    },

    /// The file held no data rows.
    #[error("No data rows in {}", .0.display())]
    EmptyData(PathBuf),

    /// A participant's outcome/choice sequence is malformed.
    #[error("Invalid sequence for participant '{participant}': {source}")]
    Sequence {
        /// Participant identifier.
        participant: String,
        /// Underlying sequence error.
        #[source]
        source: SequenceError,
    },

    /// A posterior row failed validation.
    #[error("Invalid posterior row at line {line}: {source}")]
    Posterior {
        /// Line number of the row (1-indexed).
        line: usize,
        /// Underlying posterior error.
        #[source]
        source: PosteriorError,
    },

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Inconsistent settings or arguments.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
