//! Console summary of an analysis.

use crate::analysis::{top_growth, top_impacted, Analysis, CountryImpact};
use std::io::{self, Write};

/// Format an optional percentage with two decimals.
pub fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}%", v),
        _ => "n/a".to_string(),
    }
}

fn fmt_fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.*}", decimals, value)
    }
}

fn write_ranking(out: &mut impl Write, rows: &[&CountryImpact]) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "(no countries with a computable change)");
    }
    let width = rows.iter().map(|r| r.country.chars().count()).max().unwrap_or(0);
    for row in rows {
        writeln!(
            out,
            "{:<width$}  {:>9}",
            row.country,
            fmt_pct(row.pct_change_during),
            width = width
        )?;
    }
    Ok(())
}

/// Write the summary sections to `out`.
pub fn write_summary(out: &mut impl Write, analysis: &Analysis, top_n: usize) -> io::Result<()> {
    let g = &analysis.global;

    writeln!(out, "\n=== Global Impact Summary ===")?;
    writeln!(
        out,
        "Mean percentage change during COVID: {}",
        fmt_pct(g.mean_pct_change)
    )?;
    writeln!(
        out,
        "Median percentage change during COVID: {}",
        fmt_pct(g.median_pct_change)
    )?;
    writeln!(
        out,
        "Standard deviation of change: {}",
        fmt_pct(g.std_pct_change)
    )?;

    writeln!(out, "\n=== Most and Least Impacted Countries ===")?;
    match &g.most_impacted {
        Some(e) => writeln!(out, "Most impacted country: {} ({})", e.country, fmt_pct(Some(e.value)))?,
        None => writeln!(out, "Most impacted country: n/a")?,
    }
    match &g.least_impacted {
        Some(e) => writeln!(out, "Least impacted country: {} ({})", e.country, fmt_pct(Some(e.value)))?,
        None => writeln!(out, "Least impacted country: n/a")?,
    }

    let s = &analysis.significance;
    writeln!(out, "\n=== Statistical Significance ===")?;
    writeln!(out, "t-statistic: {}", fmt_fixed(s.test.statistic, 2))?;
    writeln!(out, "p-value: {}", fmt_fixed(s.test.p_value, 4))?;
    writeln!(
        out,
        "Significant at alpha = {}: {}",
        s.alpha,
        if s.significant { "yes" } else { "no" }
    )?;

    writeln!(out, "\n=== Top {} Most Negatively Impacted Countries ===", top_n)?;
    write_ranking(out, &top_impacted(&analysis.impacts, top_n))?;

    writeln!(
        out,
        "\n=== Top {} Least Impacted/Positive Growth Countries ===",
        top_n
    )?;
    write_ranking(out, &top_growth(&analysis.impacts, top_n))?;

    Ok(())
}

/// Print the summary to stdout.
pub fn print_summary(analysis: &Analysis, top_n: usize) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_summary(&mut lock, analysis, top_n)
}
