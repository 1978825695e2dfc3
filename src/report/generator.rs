//! Markdown and JSON report generation.
//!
//! This module generates report files from the analysis results.

use super::console::fmt_pct;
use crate::analysis::{sorted_by_change, top_growth, top_impacted, CountryImpact, Significance};
use crate::models::{ChartEntry, Report, ReportMetadata};
use anyhow::Result;

fn fmt_mean(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.3}", v))
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# AI Hiring Impact Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(report));
    output.push_str(&generate_significance_section(&report.analysis.significance));
    output.push_str(&generate_rankings_section(&report.analysis.impacts, report.top_n));
    output.push_str(&generate_country_table(&report.analysis.impacts));
    output.push_str(&generate_charts_section(&report.charts));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Input:** `{}`\n", metadata.input_file));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Rows:** {}\n", metadata.rows));
    section.push_str(&format!("- **Countries:** {}\n", metadata.countries));
    if let (Some(first), Some(last)) = (metadata.first_date, metadata.last_date) {
        section.push_str(&format!("- **Date Range:** {} to {}\n", first, last));
    }
    if metadata.missing_cells > 0 {
        section.push_str(&format!(
            "- **Missing Values:** {}\n",
            metadata.missing_cells
        ));
    }
    section.push_str(&format!(
        "- **Duration:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    if !metadata.periods.is_empty() {
        section.push_str("| Period | Years | Rows |\n");
        section.push_str("|:---|:---|:---:|\n");
        for p in &metadata.periods {
            section.push_str(&format!("| {} | {} | {} |\n", p.label, p.years, p.rows));
        }
        section.push('\n');
    }

    section
}

/// Generate the global summary section.
fn generate_summary_section(report: &Report) -> String {
    let g = &report.analysis.global;
    let mut section = String::new();

    section.push_str("## Global Impact Summary\n\n");
    section.push_str("| Mean Change | Median Change | Std. Deviation | Countries |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        fmt_pct(g.mean_pct_change),
        fmt_pct(g.median_pct_change),
        fmt_pct(g.std_pct_change),
        g.countries_with_change
    ));

    if let Some(ref most) = g.most_impacted {
        section.push_str(&format!(
            "- **Most impacted:** {} ({})\n",
            most.country,
            fmt_pct(Some(most.value))
        ));
    }
    if let Some(ref least) = g.least_impacted {
        section.push_str(&format!(
            "- **Least impacted:** {} ({})\n",
            least.country,
            fmt_pct(Some(least.value))
        ));
    }
    section.push('\n');

    section
}

/// Generate the significance section.
fn generate_significance_section(significance: &Significance) -> String {
    let t = &significance.test;
    let mut section = String::new();

    section.push_str("## Statistical Significance\n\n");
    section.push_str("Two-sample Student's t-test of all pre-period values against all during-period values.\n\n");
    section.push_str(&format!("- **t-statistic:** {:.2}\n", t.statistic));
    section.push_str(&format!("- **p-value:** {:.4}\n", t.p_value));
    section.push_str(&format!("- **Degrees of freedom:** {}\n", t.df));
    section.push_str(&format!(
        "- **Samples:** {} pre (mean {:.3}), {} during (mean {:.3})\n",
        t.n_before, t.mean_before, t.n_after, t.mean_after
    ));
    section.push_str(&format!(
        "- **Significant at alpha = {}:** {}\n\n",
        significance.alpha,
        if significance.significant { "yes" } else { "no" }
    ));

    section
}

/// Generate the top/bottom ranking tables.
fn generate_rankings_section(impacts: &[CountryImpact], top_n: usize) -> String {
    let mut section = String::new();

    let tables = [
        (
            format!("Top {} Most Negatively Impacted Countries", top_n),
            top_impacted(impacts, top_n),
        ),
        (
            format!("Top {} Least Impacted/Positive Growth Countries", top_n),
            top_growth(impacts, top_n),
        ),
    ];

    for (title, rows) in tables {
        section.push_str(&format!("## {}\n\n", title));
        if rows.is_empty() {
            section.push_str("No countries with a computable change.\n\n");
            continue;
        }
        section.push_str("| # | Country | Change |\n");
        section.push_str("|:---:|:---|:---:|\n");
        for (i, row) in rows.iter().enumerate() {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                i + 1,
                row.country,
                fmt_pct(row.pct_change_during)
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the per-country table, ordered by change.
fn generate_country_table(impacts: &[CountryImpact]) -> String {
    let mut section = String::new();

    section.push_str("## Countries\n\n");
    section.push_str("| Country | Pre Mean | During Mean | Post Mean | During Change | Post Change |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|\n");

    for impact in sorted_by_change(impacts, true) {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            impact.country,
            fmt_mean(impact.pre_mean),
            fmt_mean(impact.during_mean),
            fmt_mean(impact.post_mean),
            fmt_pct(impact.pct_change_during),
            fmt_pct(impact.pct_change_post)
        ));
    }
    section.push('\n');

    section
}

/// Generate the chart listing.
fn generate_charts_section(charts: &[ChartEntry]) -> String {
    if charts.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Charts\n\n");
    for chart in charts {
        section.push_str(&format!("- [{}]({}) - {}\n", chart.file, chart.file, chart.description));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by impactscope v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ttest_ind, Analysis, GlobalMetrics, Period, PeriodWindows};
    use crate::dataset::DatasetSummary;
    use crate::models::PeriodInfo;

    fn impact(country: &str, pre: f64, during: f64) -> CountryImpact {
        CountryImpact {
            country: country.to_string(),
            pre_mean: Some(pre),
            during_mean: Some(during),
            post_mean: None,
            pct_change_during: Some((during - pre) / pre * 100.0),
            pct_change_post: None,
        }
    }

    fn create_test_report() -> Report {
        let impacts = vec![impact("Brazil", 2.0, 1.0), impact("India", 1.0, 1.5)];
        let global = GlobalMetrics::from_impacts(&impacts);
        let test = ttest_ind(&[2.0, 2.1, 1.0, 1.1], &[1.0, 0.9, 1.5, 1.6]).unwrap();

        let summary = DatasetSummary {
            rows: 72,
            countries: 2,
            first_date: chrono::NaiveDate::from_ymd_opt(2018, 1, 1),
            last_date: chrono::NaiveDate::from_ymd_opt(2023, 12, 1),
            missing_cells: 3,
        };
        let periods = vec![PeriodInfo {
            period: Period::Pre,
            label: Period::Pre.label().to_string(),
            years: "2018-2019".to_string(),
            rows: 24,
        }];

        Report {
            metadata: ReportMetadata::new("hiring.csv".to_string(), &summary, periods),
            analysis: Analysis {
                windows: PeriodWindows::default(),
                impacts,
                global,
                significance: Significance::evaluate(test, 0.05),
            },
            charts: vec![ChartEntry {
                file: "impact_by_country.svg".to_string(),
                description: "Shows the impact for all countries".to_string(),
            }],
            top_n: 5,
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&create_test_report());

        assert!(markdown.contains("# AI Hiring Impact Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("`hiring.csv`"));
        assert!(markdown.contains("- **Missing Values:** 3"));
        assert!(markdown.contains("| Pre-COVID | 2018-2019 | 24 |"));
        assert!(markdown.contains("## Statistical Significance"));
        assert!(markdown.contains("- **Most impacted:** Brazil (-50.00%)"));
        assert!(markdown.contains("| 1 | India | 50.00% |"));
        assert!(markdown.contains("| Brazil | 2.000 | 1.000 | n/a | -50.00% | n/a |"));
        assert!(markdown.contains("[impact_by_country.svg](impact_by_country.svg)"));
    }

    #[test]
    fn test_charts_section_omitted_when_empty() {
        let mut report = create_test_report();
        report.charts.clear();
        let markdown = generate_markdown_report(&report);
        assert!(!markdown.contains("## Charts"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report()).unwrap();

        assert!(json.contains("\"input_file\""));
        assert!(json.contains("\"impacts\""));
        assert!(json.contains("\"p_value\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["analysis"]["impacts"][0]["country"], "Brazil");
        assert_eq!(value["top_n"], 5);
    }
}
