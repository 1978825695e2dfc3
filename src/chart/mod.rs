//! Chart rendering.
//!
//! Writes the summary charts as standalone SVG files.

pub mod charts;
pub mod svg;

use crate::analysis::Analysis;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Settings for chart output.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Directory the SVG files are written to.
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Bars in the most-impacted chart.
    pub top_n: usize,
    /// Absolute percentage beyond which scatter points get a label.
    pub annotate_threshold: f64,
    pub show_progress: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            width: 1200,
            height: 700,
            top_n: 10,
            annotate_threshold: 50.0,
            show_progress: true,
        }
    }
}

/// The charts produced for every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    ImpactByCountry,
    PeriodDistribution,
    TopImpacted,
    RecoveryAnalysis,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::ImpactByCountry,
        ChartKind::PeriodDistribution,
        ChartKind::TopImpacted,
        ChartKind::RecoveryAnalysis,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::ImpactByCountry => "impact_by_country.svg",
            ChartKind::PeriodDistribution => "period_distribution.svg",
            ChartKind::TopImpacted => "top_10_impacted.svg",
            ChartKind::RecoveryAnalysis => "recovery_analysis.svg",
        }
    }

    pub fn description(&self, options: &ChartOptions) -> String {
        match self {
            ChartKind::ImpactByCountry => "Shows the impact for all countries".to_string(),
            ChartKind::PeriodDistribution => {
                "Shows the distribution of rates across different periods".to_string()
            }
            ChartKind::TopImpacted => {
                format!("Highlights the {} most impacted countries", options.top_n)
            }
            ChartKind::RecoveryAnalysis => {
                "Shows the relationship between impact and recovery".to_string()
            }
        }
    }

    /// Produce the SVG document for this chart.
    pub fn render(&self, analysis: &Analysis, options: &ChartOptions) -> String {
        let (w, h) = (options.width as f64, options.height as f64);
        let impacts = &analysis.impacts;
        match self {
            // Taller canvas so every country gets a readable band.
            ChartKind::ImpactByCountry => charts::impact_by_country(impacts, w, h * 8.0 / 7.0),
            ChartKind::PeriodDistribution => charts::period_distribution(impacts, w * 5.0 / 6.0, h),
            ChartKind::TopImpacted => charts::top_impacted_chart(impacts, options.top_n, w, h),
            ChartKind::RecoveryAnalysis => {
                charts::recovery_analysis(impacts, options.annotate_threshold, w, h)
            }
        }
    }
}

/// A chart written to disk.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub kind: ChartKind,
    pub path: PathBuf,
    pub description: String,
}

/// Render every chart into `options.output_dir`.
pub fn render_all(analysis: &Analysis, options: &ChartOptions) -> Result<Vec<RenderedChart>> {
    std::fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "Failed to create chart directory {}",
            options.output_dir.display()
        )
    })?;

    let pb = if options.show_progress {
        let pb = ProgressBar::new(ChartKind::ALL.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut rendered = Vec::with_capacity(ChartKind::ALL.len());
    for kind in ChartKind::ALL {
        pb.set_message(kind.file_name());
        let path = options.output_dir.join(kind.file_name());
        write_chart(&path, &kind.render(analysis, options))?;
        debug!("Wrote {}", path.display());

        rendered.push(RenderedChart {
            kind,
            path,
            description: kind.description(options),
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(
        "Rendered {} charts into {}",
        rendered.len(),
        options.output_dir.display()
    );
    Ok(rendered)
}

fn write_chart(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write chart {}", path.display()))
}
