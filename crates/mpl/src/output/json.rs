//! JSON serialization of study results.

use serde::Serialize;

use mpl_core::Summary;

use crate::hyperparams::Estimate;

/// Serializable form of a labelled [`Summary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    /// Quantity name.
    pub label: String,
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub sd: f64,
    /// 2.5% quantile.
    pub q025: f64,
    /// 97.5% quantile.
    pub q975: f64,
    /// Lower HDI bound.
    pub hdi_lower: f64,
    /// Upper HDI bound.
    pub hdi_upper: f64,
}

impl SummaryRecord {
    /// Attach a label to a summary.
    pub fn new(label: impl Into<String>, summary: &Summary) -> Self {
        Self {
            label: label.into(),
            mean: summary.mean,
            sd: summary.sd,
            q025: summary.q025,
            q975: summary.q975,
            hdi_lower: summary.hdi.0,
            hdi_upper: summary.hdi.1,
        }
    }
}

impl From<&Estimate> for SummaryRecord {
    fn from(e: &Estimate) -> Self {
        Self::new(e.label.clone(), &e.summary)
    }
}

/// Serialize a report to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (non-string map keys).
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
