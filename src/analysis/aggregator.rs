//! Per-country period aggregation and cross-country statistics.
//!
//! Missing cells never contribute to a mean. A country whose baseline
//! mean is missing or zero has no percentage change and is left out of
//! the global metrics.

use super::periods::{Period, PeriodWindows};
use crate::dataset::Dataset;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};
use std::cmp::Ordering;

/// Arithmetic mean of the values, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().mean())
}

/// Median, averaging the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(Data::new(values.to_vec()).median())
}

/// Quantile with linear interpolation between closest ranks.
///
/// `values` must already be sorted ascending. Box plot quartiles need
/// this definition rather than the R-8 estimate behind `Data::quantile`.
pub fn quantile_sorted(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (values.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(values[lower] + (values[upper] - values[lower]) * frac)
}

/// Sample standard deviation (n - 1), `None` with fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(values.iter().std_dev())
}

/// Percentage change from `from` to `to`.
pub fn pct_change(from: Option<f64>, to: Option<f64>) -> Option<f64> {
    let (from, to) = (from?, to?);
    if from == 0.0 {
        return None;
    }
    Some((to - from) / from * 100.0).filter(|v| v.is_finite())
}

/// Period means and changes for one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryImpact {
    pub country: String,
    pub pre_mean: Option<f64>,
    pub during_mean: Option<f64>,
    pub post_mean: Option<f64>,
    /// Change of the during-period mean relative to the pre-period mean.
    pub pct_change_during: Option<f64>,
    /// Change of the post-period mean relative to the pre-period mean.
    pub pct_change_post: Option<f64>,
}

impl CountryImpact {
    pub fn period_mean(&self, period: Period) -> Option<f64> {
        match period {
            Period::Pre => self.pre_mean,
            Period::During => self.during_mean,
            Period::Post => self.post_mean,
        }
    }
}

/// Compute period means and changes for every country, in column order.
pub fn country_impacts(dataset: &Dataset, windows: &PeriodWindows) -> Vec<CountryImpact> {
    let pre_rows = dataset.rows_in_years(&windows.pre);
    let during_rows = dataset.rows_in_years(&windows.during);
    let post_rows = dataset.rows_in_years(&windows.post);

    dataset
        .series
        .iter()
        .map(|s| {
            let pre_mean = mean(&s.values_at(&pre_rows));
            let during_mean = mean(&s.values_at(&during_rows));
            let post_mean = mean(&s.values_at(&post_rows));

            CountryImpact {
                country: s.name.clone(),
                pre_mean,
                during_mean,
                post_mean,
                pct_change_during: pct_change(pre_mean, during_mean),
                pct_change_post: pct_change(pre_mean, post_mean),
            }
        })
        .collect()
}

/// A country and its change value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extreme {
    pub country: String,
    pub value: f64,
}

/// Statistics of `pct_change_during` across countries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalMetrics {
    pub mean_pct_change: Option<f64>,
    pub median_pct_change: Option<f64>,
    pub std_pct_change: Option<f64>,
    /// Largest decline (minimum change).
    pub most_impacted: Option<Extreme>,
    /// Smallest decline or largest growth (maximum change).
    pub least_impacted: Option<Extreme>,
    /// Countries that contributed a change value.
    pub countries_with_change: usize,
}

impl GlobalMetrics {
    pub fn from_impacts(impacts: &[CountryImpact]) -> Self {
        let changes: Vec<(&str, f64)> = impacts
            .iter()
            .filter_map(|i| i.pct_change_during.map(|v| (i.country.as_str(), v)))
            .collect();
        let values: Vec<f64> = changes.iter().map(|(_, v)| *v).collect();

        // Strict comparisons keep the first country on ties.
        let mut most: Option<(&str, f64)> = None;
        let mut least: Option<(&str, f64)> = None;
        for &(country, value) in &changes {
            if most.map_or(true, |(_, m)| value < m) {
                most = Some((country, value));
            }
            if least.map_or(true, |(_, m)| value > m) {
                least = Some((country, value));
            }
        }

        let to_extreme = |(country, value): (&str, f64)| Extreme {
            country: country.to_string(),
            value,
        };

        Self {
            mean_pct_change: mean(&values),
            median_pct_change: median(&values),
            std_pct_change: sample_std(&values),
            most_impacted: most.map(to_extreme),
            least_impacted: least.map(to_extreme),
            countries_with_change: values.len(),
        }
    }
}

/// Order countries by `pct_change_during`; countries without a value go last.
pub fn sorted_by_change(impacts: &[CountryImpact], ascending: bool) -> Vec<&CountryImpact> {
    let mut sorted: Vec<&CountryImpact> = impacts.iter().collect();
    sorted.sort_by(|a, b| match (a.pct_change_during, b.pct_change_during) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    sorted
}

/// The `n` countries with the most negative change.
pub fn top_impacted(impacts: &[CountryImpact], n: usize) -> Vec<&CountryImpact> {
    sorted_by_change(impacts, true)
        .into_iter()
        .filter(|i| i.pct_change_during.is_some())
        .take(n)
        .collect()
}

/// The `n` countries with the most positive change.
pub fn top_growth(impacts: &[CountryImpact], n: usize) -> Vec<&CountryImpact> {
    sorted_by_change(impacts, false)
        .into_iter()
        .filter(|i| i.pct_change_during.is_some())
        .take(n)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, DatasetOptions};
    use std::path::Path;

    fn impact(country: &str, change: Option<f64>) -> CountryImpact {
        CountryImpact {
            country: country.to_string(),
            pre_mean: Some(1.0),
            during_mean: None,
            post_mean: None,
            pct_change_during: change,
            pct_change_post: None,
        }
    }

    #[test]
    fn test_mean_median_std() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert!((median(&[4.0, 1.0, 3.0, 2.0]).unwrap() - 2.5).abs() < 1e-12);
        assert_eq!(sample_std(&[5.0]), None);
        assert_eq!(sample_std(&[3.0, 3.0]), Some(0.0));

        let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((std - 2.138089935299395).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_sorted() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&values, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&values, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&values, 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&values, 1.0), Some(4.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_pct_change() {
        assert_eq!(pct_change(Some(2.0), Some(1.0)), Some(-50.0));
        assert_eq!(pct_change(Some(2.0), Some(3.0)), Some(50.0));
        assert_eq!(pct_change(Some(0.0), Some(3.0)), None);
        assert_eq!(pct_change(None, Some(3.0)), None);
        assert_eq!(pct_change(Some(1.0), None), None);
    }

    #[test]
    fn test_country_impacts() {
        let csv = "\
Date,A,B
01/01/18,2%,1%
01/01/19,2%,
01/01/20,1%,2%
01/01/22,1%,2%
01/01/23,3%,
";
        let ds = Dataset::from_reader(csv.as_bytes(), Path::new("t.csv"), &DatasetOptions::default())
            .unwrap();
        let impacts = country_impacts(&ds, &PeriodWindows::default());

        assert_eq!(impacts.len(), 2);
        let a = &impacts[0];
        assert_eq!(a.pre_mean, Some(2.0));
        assert_eq!(a.during_mean, Some(1.0));
        assert_eq!(a.post_mean, Some(3.0));
        assert_eq!(a.pct_change_during, Some(-50.0));
        assert_eq!(a.pct_change_post, Some(50.0));

        let b = &impacts[1];
        assert_eq!(b.pre_mean, Some(1.0));
        assert_eq!(b.pct_change_during, Some(100.0));
        assert_eq!(b.post_mean, None);
        assert_eq!(b.pct_change_post, None);
    }

    #[test]
    fn test_global_metrics() {
        let impacts = vec![
            impact("A", Some(-40.0)),
            impact("B", Some(10.0)),
            impact("C", None),
            impact("D", Some(-10.0)),
            impact("E", Some(10.0)),
        ];
        let g = GlobalMetrics::from_impacts(&impacts);

        assert_eq!(g.countries_with_change, 4);
        assert!((g.mean_pct_change.unwrap() + 7.5).abs() < 1e-9);
        assert!(g.median_pct_change.unwrap().abs() < 1e-9);
        assert_eq!(g.most_impacted.as_ref().map(|e| e.country.as_str()), Some("A"));
        // First of the tied maxima wins
        assert_eq!(g.least_impacted.as_ref().map(|e| e.country.as_str()), Some("B"));
        assert!(g.std_pct_change.unwrap() > 0.0);
    }

    #[test]
    fn test_global_metrics_empty() {
        let g = GlobalMetrics::from_impacts(&[impact("A", None)]);
        assert_eq!(g.countries_with_change, 0);
        assert_eq!(g.mean_pct_change, None);
        assert!(g.most_impacted.is_none());
    }

    #[test]
    fn test_sorting_and_top_n() {
        let impacts = vec![
            impact("A", Some(5.0)),
            impact("B", None),
            impact("C", Some(-20.0)),
            impact("D", Some(30.0)),
        ];

        let asc: Vec<_> = sorted_by_change(&impacts, true)
            .iter()
            .map(|i| i.country.as_str())
            .collect();
        assert_eq!(asc, vec!["C", "A", "D", "B"]);

        let desc: Vec<_> = sorted_by_change(&impacts, false)
            .iter()
            .map(|i| i.country.as_str())
            .collect();
        assert_eq!(desc, vec!["D", "A", "C", "B"]);

        let worst = top_impacted(&impacts, 2);
        assert_eq!(worst.len(), 2);
        assert_eq!(worst[0].country, "C");

        let best = top_growth(&impacts, 10);
        assert_eq!(best.len(), 3);
        assert_eq!(best[0].country, "D");
    }
}
