//! Two-sample significance testing.
//!
//! Uses the Student-t distribution from `statrs` for p-values.

use super::aggregator::mean;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Result of an independent two-sample t-test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TTest {
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    pub df: f64,
    pub n_before: usize,
    pub n_after: usize,
    pub mean_before: f64,
    pub mean_after: f64,
}

/// Student's t-test for two independent samples with pooled variance.
///
/// A positive statistic means `before` has the larger mean.
pub fn ttest_ind(before: &[f64], after: &[f64]) -> Result<TTest> {
    if before.len() < 2 || after.len() < 2 {
        bail!(
            "Need at least 2 observations per sample for a t-test (got {} and {})",
            before.len(),
            after.len()
        );
    }

    let n1 = before.len() as f64;
    let n2 = after.len() as f64;
    let m1 = mean(before).unwrap_or(f64::NAN);
    let m2 = mean(after).unwrap_or(f64::NAN);

    let ss1: f64 = before.iter().map(|v| (v - m1).powi(2)).sum();
    let ss2: f64 = after.iter().map(|v| (v - m2).powi(2)).sum();
    let df = n1 + n2 - 2.0;
    let pooled = (ss1 + ss2) / df;
    let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    let diff = m1 - m2;

    let (statistic, p_value) = if se == 0.0 {
        if diff == 0.0 {
            (f64::NAN, f64::NAN)
        } else {
            (diff.signum() * f64::INFINITY, 0.0)
        }
    } else {
        let t = diff / se;
        let dist = StudentsT::new(0.0, 1.0, df).context("Invalid degrees of freedom")?;
        let p = (2.0 * dist.sf(t.abs())).min(1.0);
        (t, p)
    };

    Ok(TTest {
        statistic,
        p_value,
        df,
        n_before: before.len(),
        n_after: after.len(),
        mean_before: m1,
        mean_after: m2,
    })
}

/// A t-test judged against a significance level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Significance {
    pub test: TTest,
    pub alpha: f64,
    pub significant: bool,
}

impl Significance {
    pub fn evaluate(test: TTest, alpha: f64) -> Self {
        // NaN p-values compare false, so a degenerate test is never significant.
        let significant = test.p_value < alpha;
        Self {
            test,
            alpha,
            significant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttest_known_values() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [3.0, 4.0, 5.0, 6.0, 7.0];
        let result = ttest_ind(&a, &b).unwrap();

        assert!((result.statistic - (-2.0)).abs() < 1e-12);
        assert_eq!(result.df, 8.0);
        assert!(
            (result.p_value - 0.080516238).abs() < 1e-6,
            "p-value {}",
            result.p_value
        );
        assert_eq!(result.mean_before, 3.0);
        assert_eq!(result.mean_after, 5.0);
    }

    #[test]
    fn test_ttest_is_antisymmetric() {
        let a = [10.0, 12.0, 11.0, 13.0, 10.0];
        let b = [25.0, 27.0, 26.0, 28.0, 25.0];
        let ab = ttest_ind(&a, &b).unwrap();
        let ba = ttest_ind(&b, &a).unwrap();

        assert!(ab.statistic < 0.0);
        assert!((ab.statistic + ba.statistic).abs() < 1e-12);
        assert!((ab.p_value - ba.p_value).abs() < 1e-12);
        assert!(ab.p_value < 0.001);
    }

    #[test]
    fn test_ttest_unequal_sizes() {
        let a = [1.0, 2.0, 3.0];
        let b = [1.5, 2.5, 3.5, 2.0, 3.0, 1.0];
        let result = ttest_ind(&a, &b).unwrap();
        assert_eq!(result.df, 7.0);
        assert!(result.p_value > 0.5);
    }

    #[test]
    fn test_ttest_requires_two_observations() {
        assert!(ttest_ind(&[1.0], &[1.0, 2.0]).is_err());
        assert!(ttest_ind(&[], &[]).is_err());
    }

    #[test]
    fn test_ttest_zero_variance() {
        let same = ttest_ind(&[2.0, 2.0], &[2.0, 2.0]).unwrap();
        assert!(same.statistic.is_nan());
        assert!(same.p_value.is_nan());

        let apart = ttest_ind(&[1.0, 1.0], &[3.0, 3.0]).unwrap();
        assert_eq!(apart.statistic, f64::NEG_INFINITY);
        assert_eq!(apart.p_value, 0.0);
    }

    #[test]
    fn test_significance_threshold() {
        let test = ttest_ind(&[1.0, 2.0, 3.0, 4.0, 5.0], &[3.0, 4.0, 5.0, 6.0, 7.0]).unwrap();
        assert!(!Significance::evaluate(test.clone(), 0.05).significant);
        assert!(Significance::evaluate(test, 0.10).significant);

        let degenerate = ttest_ind(&[2.0, 2.0], &[2.0, 2.0]).unwrap();
        assert!(!Significance::evaluate(degenerate, 0.05).significant);
    }
}
