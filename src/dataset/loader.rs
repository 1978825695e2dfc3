//! CSV loading and cell cleaning.

use super::DataError;
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Options controlling how the input CSV is interpreted.
#[derive(Debug, Clone)]
pub struct DatasetOptions {
    /// Name of the column holding the observation date.
    pub date_column: String,
    /// `chrono` format string for the date column.
    pub date_format: String,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            date_format: "%m/%d/%y".to_string(),
        }
    }
}

impl From<&crate::config::DataConfig> for DatasetOptions {
    fn from(config: &crate::config::DataConfig) -> Self {
        Self {
            date_column: config.date_column.clone(),
            date_format: config.date_format.clone(),
        }
    }
}

/// One country column.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    /// One entry per dataset row; `None` marks a missing or unparseable cell.
    pub values: Vec<Option<f64>>,
}

impl Series {
    /// Present values at the given row indices.
    pub fn values_at(&self, rows: &[usize]) -> Vec<f64> {
        rows.iter()
            .filter_map(|&i| self.values.get(i).copied().flatten())
            .collect()
    }

    /// Number of missing cells.
    pub fn missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

/// Wide table: a date per row and one series per country.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: PathBuf,
    pub dates: Vec<NaiveDate>,
    pub series: Vec<Series>,
}

/// Shape of a loaded dataset, for logging and dry runs.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub countries: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub missing_cells: usize,
}

/// Convert a percentage string such as `"12.5%"` to a float.
///
/// Plain numbers are accepted as-is. Anything unparseable, empty or
/// non-finite yields `None`.
pub fn clean_percentage(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = if trimmed.contains('%') {
        trimmed.replace('%', "")
    } else {
        trimmed.to_string()
    };

    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

impl Dataset {
    /// Load and clean a dataset from a CSV file.
    pub fn load(path: &Path, options: &DatasetOptions) -> Result<Self> {
        if !path.exists() {
            return Err(DataError::NotFound(path.to_path_buf()).into());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let dataset = Self::from_reader(file, path, options)?;

        if dataset.dates.is_empty() {
            return Err(DataError::Empty(path.to_path_buf()).into());
        }

        Ok(dataset)
    }

    /// Parse a dataset from any reader. `source` is recorded for reporting only.
    pub fn from_reader<R: std::io::Read>(
        reader: R,
        source: &Path,
        options: &DatasetOptions,
    ) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .with_context(|| format!("Failed to read header of {}", source.display()))?
            .clone();

        let date_idx = headers
            .iter()
            .position(|h| h == options.date_column)
            .ok_or_else(|| DataError::MissingDateColumn(options.date_column.clone()))?;

        let mut series: Vec<(usize, Series)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_idx)
            .map(|(i, name)| {
                (
                    i,
                    Series {
                        name: name.to_string(),
                        values: Vec::new(),
                    },
                )
            })
            .collect();

        if series.is_empty() {
            return Err(DataError::NoSeries(options.date_column.clone()).into());
        }

        let mut dates = Vec::new();

        for (row_idx, record) in rdr.records().enumerate() {
            let record = record
                .with_context(|| format!("Failed to read row {} of {}", row_idx + 1, source.display()))?;

            let raw_date = record.get(date_idx).unwrap_or("").trim();
            let date = NaiveDate::parse_from_str(raw_date, &options.date_format).map_err(|_| {
                DataError::BadDate {
                    row: row_idx + 1,
                    value: raw_date.to_string(),
                    format: options.date_format.clone(),
                }
            })?;
            dates.push(date);

            for (col, s) in series.iter_mut() {
                let value = record.get(*col).and_then(clean_percentage);
                s.values.push(value);
            }
        }

        let dataset = Self {
            source: source.to_path_buf(),
            dates,
            series: series.into_iter().map(|(_, s)| s).collect(),
        };

        for s in &dataset.series {
            let missing = s.missing();
            if missing == dataset.dates.len() && missing > 0 {
                warn!("Column '{}' has no numeric values", s.name);
            } else if missing > 0 {
                debug!("Column '{}' has {} missing values", s.name, missing);
            }
        }

        Ok(dataset)
    }

    /// Row indices whose date falls in one of the given years.
    pub fn rows_in_years(&self, years: &[i32]) -> Vec<usize> {
        let wanted: HashSet<i32> = years.iter().copied().collect();
        self.dates
            .iter()
            .enumerate()
            .filter(|(_, d)| wanted.contains(&d.year()))
            .map(|(i, _)| i)
            .collect()
    }

    /// All present values of every country in the matching rows, row-major.
    pub fn values_in_years(&self, years: &[i32]) -> Vec<f64> {
        let rows = self.rows_in_years(years);
        rows.iter()
            .flat_map(|&r| self.series.iter().filter_map(move |s| s.values[r]))
            .collect()
    }

    /// Country names in column order.
    pub fn countries(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            rows: self.dates.len(),
            countries: self.series.len(),
            first_date: self.dates.iter().min().copied(),
            last_date: self.dates.iter().max().copied(),
            missing_cells: self.series.iter().map(Series::missing).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Date,Brazil,India,Canada
01/01/18,1.0%,2.0%,
06/01/19,3.0%,4.0%,5%
01/01/20,0.5%,n/a,2.5
12/01/23,2.0%,8.0%,6.0%
";

    fn sample() -> Dataset {
        Dataset::from_reader(
            SAMPLE.as_bytes(),
            Path::new("sample.csv"),
            &DatasetOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_clean_percentage() {
        assert_eq!(clean_percentage("12.5%"), Some(12.5));
        assert_eq!(clean_percentage(" -3% "), Some(-3.0));
        assert_eq!(clean_percentage("0.75"), Some(0.75));
        assert_eq!(clean_percentage(""), None);
        assert_eq!(clean_percentage("n/a"), None);
        assert_eq!(clean_percentage("%"), None);
        assert_eq!(clean_percentage("NaN"), None);
    }

    #[test]
    fn test_load_parses_dates_and_values() {
        let ds = sample();
        assert_eq!(ds.dates.len(), 4);
        assert_eq!(ds.dates[0], NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
        assert_eq!(ds.countries(), vec!["Brazil", "India", "Canada"]);
        assert_eq!(ds.series[0].values[1], Some(3.0));
        assert_eq!(ds.series[1].values[2], None);
        assert_eq!(ds.series[2].values[0], None);
        assert_eq!(ds.series[2].values[2], Some(2.5));
    }

    #[test]
    fn test_rows_and_values_in_years() {
        let ds = sample();
        assert_eq!(ds.rows_in_years(&[2018, 2019]), vec![0, 1]);
        assert_eq!(ds.rows_in_years(&[2021]), Vec::<usize>::new());

        // Row-major, missing cells dropped
        let values = ds.values_in_years(&[2018, 2019]);
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_summary() {
        let summary = sample().summary();
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.countries, 3);
        assert_eq!(summary.missing_cells, 2);
        assert_eq!(summary.first_date, NaiveDate::from_ymd_opt(2018, 1, 1));
        assert_eq!(summary.last_date, NaiveDate::from_ymd_opt(2023, 12, 1));
    }

    #[test]
    fn test_missing_date_column() {
        let err = Dataset::from_reader(
            "When,Brazil\n01/01/18,1%\n".as_bytes(),
            Path::new("x.csv"),
            &DatasetOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::MissingDateColumn(_))
        ));
    }

    #[test]
    fn test_bad_date_reports_row() {
        let err = Dataset::from_reader(
            "Date,Brazil\n01/01/18,1%\n2019-01-01,2%\n".as_bytes(),
            Path::new("x.csv"),
            &DatasetOptions::default(),
        )
        .unwrap_err();
        match err.downcast_ref::<DataError>() {
            Some(DataError::BadDate { row, value, .. }) => {
                assert_eq!(*row, 2);
                assert_eq!(value, "2019-01-01");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_custom_date_format() {
        let options = DatasetOptions {
            date_column: "month".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        };
        let ds = Dataset::from_reader(
            "month,Brazil\n2020-03-01,1.5%\n".as_bytes(),
            Path::new("x.csv"),
            &options,
        )
        .unwrap();
        assert_eq!(ds.rows_in_years(&[2020]), vec![0]);
    }

    #[test]
    fn test_short_rows_pad_with_missing() {
        let ds = Dataset::from_reader(
            "Date,A,B,C\n01/01/18,1%\n01/01/19,2%,3%,4%\n".as_bytes(),
            Path::new("x.csv"),
            &DatasetOptions::default(),
        )
        .unwrap();

        assert_eq!(ds.series.len(), 3);
        assert_eq!(ds.series[0].values, vec![Some(1.0), Some(2.0)]);
        assert_eq!(ds.series[1].values, vec![None, Some(3.0)]);
        assert_eq!(ds.series[2].values, vec![None, Some(4.0)]);
        assert_eq!(ds.summary().missing_cells, 2);
    }

    #[test]
    fn test_no_series() {
        let err = Dataset::from_reader(
            "Date\n01/01/18\n".as_bytes(),
            Path::new("x.csv"),
            &DatasetOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::NoSeries(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Dataset::load(Path::new("does/not/exist.csv"), &DatasetOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("was not found"));
    }

    #[test]
    fn test_load_fixture() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/hiring_rates.csv");
        let ds = Dataset::load(&path, &DatasetOptions::default()).unwrap();
        assert!(ds.series.len() >= 10);
        assert!(!ds.rows_in_years(&[2018, 2019]).is_empty());
        assert!(!ds.rows_in_years(&[2023]).is_empty());
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "Date,Brazil\n").unwrap();
        let err = Dataset::load(&path, &DatasetOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::Empty(_))
        ));
    }
}
