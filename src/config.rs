//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.impactscope.toml` files.

use crate::analysis::PeriodWindows;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".impactscope.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input table settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Calendar windows.
    #[serde(default)]
    pub periods: PeriodsConfig,

    /// Statistics settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Chart settings.
    #[serde(default)]
    pub charts: ChartsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory for rendered charts.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            verbose: false,
        }
    }
}

fn default_output_dir() -> String {
    ".".to_string()
}

/// Input CSV settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Column holding the observation date.
    #[serde(default = "default_date_column")]
    pub date_column: String,

    /// `chrono` format of the date column.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            date_column: default_date_column(),
            date_format: default_date_format(),
        }
    }
}

fn default_date_column() -> String {
    "Date".to_string()
}

fn default_date_format() -> String {
    "%m/%d/%y".to_string()
}

/// Years assigned to each period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodsConfig {
    #[serde(default = "default_pre")]
    pub pre: Vec<i32>,

    #[serde(default = "default_during")]
    pub during: Vec<i32>,

    #[serde(default = "default_post")]
    pub post: Vec<i32>,
}

impl Default for PeriodsConfig {
    fn default() -> Self {
        Self {
            pre: default_pre(),
            during: default_during(),
            post: default_post(),
        }
    }
}

fn default_pre() -> Vec<i32> {
    PeriodWindows::default().pre
}

fn default_during() -> Vec<i32> {
    PeriodWindows::default().during
}

fn default_post() -> Vec<i32> {
    PeriodWindows::default().post
}

impl PeriodsConfig {
    pub fn windows(&self) -> PeriodWindows {
        PeriodWindows {
            pre: self.pre.clone(),
            during: self.during.clone(),
            post: self.post.clone(),
        }
    }
}

/// Statistics and ranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Significance level for the t-test.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Countries listed in each ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Countries shown in the most-impacted chart.
    #[serde(default = "default_chart_top_n")]
    pub chart_top_n: usize,

    /// Scatter points beyond this absolute change (%) are labelled.
    #[serde(default = "default_annotate_threshold")]
    pub annotate_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            top_n: default_top_n(),
            chart_top_n: default_chart_top_n(),
            annotate_threshold: default_annotate_threshold(),
        }
    }
}

fn default_alpha() -> f64 {
    0.05
}

fn default_top_n() -> usize {
    5
}

fn default_chart_top_n() -> usize {
    10
}

fn default_annotate_threshold() -> f64 {
    50.0
}

/// Chart rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    /// Render charts at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Canvas width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Canvas height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_width() -> u32 {
    1200
}

fn default_height() -> u32 {
    700
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load `CONFIG_FILE` from `dir`.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE);

        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.output_dir {
            self.general.output_dir = dir.display().to_string();
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(ref column) = args.date_column {
            self.data.date_column = column.clone();
        }
        if let Some(ref format) = args.date_format {
            self.data.date_format = format.clone();
        }

        if let Some(ref years) = args.pre {
            self.periods.pre = years.clone();
        }
        if let Some(ref years) = args.during {
            self.periods.during = years.clone();
        }
        if let Some(ref years) = args.post {
            self.periods.post = years.clone();
        }

        if let Some(alpha) = args.alpha {
            self.analysis.alpha = alpha;
        }
        if let Some(top) = args.top {
            self.analysis.top_n = top;
        }

        if args.no_charts {
            self.charts.enabled = false;
        }
    }

    /// Check values that serde defaults cannot guard.
    pub fn validate(&self) -> Result<()> {
        if !(self.analysis.alpha > 0.0 && self.analysis.alpha < 1.0) {
            bail!("alpha must be between 0 and 1 (got {})", self.analysis.alpha);
        }
        if self.analysis.top_n == 0 || self.analysis.chart_top_n == 0 {
            bail!("top_n and chart_top_n must be at least 1");
        }
        if self.charts.width < 200 || self.charts.height < 200 {
            bail!(
                "Chart size {}x{} is too small (minimum 200x200)",
                self.charts.width,
                self.charts.height
            );
        }
        self.periods
            .windows()
            .validate()
            .context("Invalid [periods] configuration")
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
