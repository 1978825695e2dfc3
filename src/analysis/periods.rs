//! Calendar windows around the reference event.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One of the three comparison periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Pre,
    During,
    Post,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Pre, Period::During, Period::Post];

    /// Default human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Period::Pre => "Pre-COVID",
            Period::During => "During COVID",
            Period::Post => "Post-COVID",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Years belonging to each period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindows {
    pub pre: Vec<i32>,
    pub during: Vec<i32>,
    pub post: Vec<i32>,
}

impl Default for PeriodWindows {
    fn default() -> Self {
        Self {
            pre: vec![2018, 2019],
            during: vec![2020, 2021, 2022],
            post: vec![2023],
        }
    }
}

impl PeriodWindows {
    pub fn years(&self, period: Period) -> &[i32] {
        match period {
            Period::Pre => &self.pre,
            Period::During => &self.during,
            Period::Post => &self.post,
        }
    }

    /// Every window must be non-empty and windows must not share a year.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for period in Period::ALL {
            let years = self.years(period);
            if years.is_empty() {
                bail!("Period '{}' has no years", period);
            }
            for year in years {
                if !seen.insert(*year) {
                    bail!("Year {} appears in more than one period", year);
                }
            }
        }
        Ok(())
    }

    /// Compact form such as `2018-2019` or `2018, 2020`.
    pub fn describe(&self, period: Period) -> String {
        let mut years = self.years(period).to_vec();
        years.sort_unstable();
        years.dedup();

        let contiguous = years.windows(2).all(|w| w[1] == w[0] + 1);
        match years.as_slice() {
            [] => String::new(),
            [only] => only.to_string(),
            [first, .., last] if contiguous => format!("{}-{}", first, last),
            _ => years
                .iter()
                .map(|y| y.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
