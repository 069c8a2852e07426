//! Rendering of study results for the terminal and as JSON.

mod json;
mod terminal;

pub use json::{to_json_pretty, SummaryRecord};
pub use terminal::{format_estimates, format_row, format_summary_line};
