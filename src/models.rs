//! Data models for reports.
//!
//! This module contains the structures that tie an analysis run
//! together for output: run metadata, chart listings and the report.

use crate::analysis::{Analysis, Period};
use crate::dataset::DatasetSummary;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Years and row count of one period, as recorded in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodInfo {
    pub period: Period,
    pub label: String,
    pub years: String,
    pub rows: usize,
}

/// Metadata about an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Input CSV path.
    pub input_file: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Data rows in the input.
    pub rows: usize,
    /// Country columns in the input.
    pub countries: usize,
    /// Earliest and latest observation dates.
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Cells that were empty or not numeric.
    pub missing_cells: usize,
    pub periods: Vec<PeriodInfo>,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

impl ReportMetadata {
    pub fn new(input_file: String, summary: &DatasetSummary, periods: Vec<PeriodInfo>) -> Self {
        Self {
            input_file,
            generated_at: Utc::now(),
            rows: summary.rows,
            countries: summary.countries,
            first_date: summary.first_date,
            last_date: summary.last_date,
            missing_cells: summary.missing_cells,
            periods,
            duration_seconds: 0.0,
        }
    }
}

/// A chart file listed in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub file: String,
    pub description: String,
}

/// The complete analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub analysis: Analysis,
    pub charts: Vec<ChartEntry>,
    /// Countries listed in each ranking.
    pub top_n: usize,
}
