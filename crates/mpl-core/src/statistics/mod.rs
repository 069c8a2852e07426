//! Summaries of scalar sample collections.
//!
//! - **HDI** (`hdi`): shortest interval holding a given share of the samples
//! - **Quantiles** (`quantile`): linear interpolation between order statistics
//! - **Summary** (`summary`): mean, sd, central 95% interval and HDI in one pass

mod hdi;
mod quantile;
mod summary;

pub use hdi::{hdi, hdi_sorted};
pub use quantile::{quantile, quantile_sorted};
pub use summary::Summary;
