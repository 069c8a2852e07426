//! Plain-text output: tab-separated numbers with two decimals.

use mpl_core::Summary;

use crate::hyperparams::Estimate;

/// Join numbers with tabs, two decimals each.
pub fn format_row(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{:.2}", v))
        .collect::<Vec<_>>()
        .join("\t")
}

/// `label  mean  sd  q2.5  q97.5  hdi_lo  hdi_hi` on one line.
pub fn format_summary_line(label: &str, summary: &Summary) -> String {
    format!(
        "{}\t{}",
        label,
        format_row(&[
            summary.mean,
            summary.sd,
            summary.q025,
            summary.q975,
            summary.hdi.0,
            summary.hdi.1,
        ])
    )
}

/// One line per estimate, under a header.
pub fn format_estimates(estimates: &[Estimate]) -> String {
    let mut out = String::from("quantity\tmean\tsd\tq2.5\tq97.5\thdi_lo\thdi_hi\n");
    for e in estimates {
        out.push_str(&format_summary_line(&e.label, &e.summary));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_row() {
        assert_eq!(format_row(&[0.123, 1.0, -2.5]), "0.12\t1.00\t-2.50");
        assert_eq!(format_row(&[]), "");
    }

    #[test]
    fn test_summary_line() {
        let s = Summary::from_samples(&[0.5, 0.5, 0.5], 0.95);
        assert_eq!(
            format_summary_line("A", &s),
            "A\t0.50\t0.00\t0.50\t0.50\t0.50\t0.50"
        );
    }
}
