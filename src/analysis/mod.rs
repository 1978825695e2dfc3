//! Period analysis.
//!
//! Aggregates each country's series into period means, derives
//! cross-country metrics and tests whether the pre and during periods
//! differ.

pub mod aggregator;
pub mod periods;
pub mod significance;

pub use aggregator::*;
pub use periods::*;
pub use significance::*;

use crate::dataset::Dataset;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Everything computed from one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub windows: PeriodWindows,
    pub impacts: Vec<CountryImpact>,
    pub global: GlobalMetrics,
    pub significance: Significance,
}

/// Run the full aggregation and significance test.
pub fn analyze(dataset: &Dataset, windows: &PeriodWindows, alpha: f64) -> Result<Analysis> {
    windows.validate()?;

    for period in Period::ALL {
        let rows = dataset.rows_in_years(windows.years(period));
        debug!("{}: {} rows ({})", period, rows.len(), windows.describe(period));
    }

    info!("Analyzing {} countries", dataset.series.len());
    let impacts = country_impacts(dataset, windows);
    let global = GlobalMetrics::from_impacts(&impacts);

    let before = dataset.values_in_years(&windows.pre);
    let after = dataset.values_in_years(&windows.during);
    debug!(
        "t-test samples: {} pre values, {} during values",
        before.len(),
        after.len()
    );
    let test = ttest_ind(&before, &after)
        .context("Cannot compare pre and during periods")?;

    Ok(Analysis {
        windows: windows.clone(),
        impacts,
        global,
        significance: Significance::evaluate(test, alpha),
    })
}
