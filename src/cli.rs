//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// ImpactScope - compare AI hiring rates around a reference event
///
/// Loads a wide CSV of hiring rates (one date column, one column per
/// country), compares the pre, during and post periods, runs a t-test
/// and renders SVG charts.
///
/// Examples:
///   impactscope fig_4.2.13.csv
///   impactscope data.csv --output-dir charts --report report.md
///   impactscope data.csv --pre 2016,2017 --during 2018,2019 --post 2020
///   impactscope data.csv --dry-run
///   impactscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// CSV file with hiring rates by country
    #[arg(
        value_name = "INPUT",
        default_value = "fig_4.2.13.csv",
        env = "IMPACTSCOPE_INPUT"
    )]
    pub input: PathBuf,

    /// Directory for the rendered charts
    ///
    /// Defaults to the current directory or the config file setting.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .impactscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Name of the date column
    #[arg(long, value_name = "NAME")]
    pub date_column: Option<String>,

    /// Date format of the date column (chrono syntax, e.g. %m/%d/%y)
    #[arg(long, value_name = "FORMAT")]
    pub date_format: Option<String>,

    /// Years before the event (comma-separated)
    #[arg(long, value_name = "YEARS", value_delimiter = ',')]
    pub pre: Option<Vec<i32>>,

    /// Years during the event (comma-separated)
    #[arg(long, value_name = "YEARS", value_delimiter = ',')]
    pub during: Option<Vec<i32>>,

    /// Years after the event (comma-separated)
    #[arg(long, value_name = "YEARS", value_delimiter = ',')]
    pub post: Option<Vec<i32>>,

    /// Significance level for the t-test
    #[arg(long, value_name = "ALPHA")]
    pub alpha: Option<f64>,

    /// Number of countries in each console ranking
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Skip chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Also write a report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Report format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Exit with code 2 when the pre/during difference is significant
    ///
    /// Useful in pipelines that should flag a significant shift.
    #[arg(long)]
    pub fail_if_significant: bool,

    /// Dry run: load and validate the data without analysis or charts
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .impactscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(alpha) = self.alpha {
            if !(alpha > 0.0 && alpha < 1.0) {
                return Err("Alpha must be between 0 and 1 (exclusive)".to_string());
            }
        }

        if self.top == Some(0) {
            return Err("Top count must be at least 1".to_string());
        }

        let windows = [
            ("--pre", &self.pre),
            ("--during", &self.during),
            ("--post", &self.post),
        ];
        for (flag, years) in windows {
            if matches!(years, Some(y) if y.is_empty()) {
                return Err(format!("{} needs at least one year", flag));
            }
        }

        if self.input.is_dir() {
            return Err(format!(
                "Input path is a directory: {}",
                self.input.display()
            ));
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general] verbose`; `--quiet` wins over both.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: PathBuf::from("fig_4.2.13.csv"),
            output_dir: None,
            config: None,
            verbose: false,
            quiet: false,
            date_column: None,
            date_format: None,
            pre: None,
            during: None,
            post: None,
            alpha: None,
            top: None,
            no_charts: false,
            report: None,
            format: OutputFormat::Markdown,
            fail_if_significant: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_years() {
        let args = Args::parse_from([
            "impactscope",
            "data.csv",
            "--pre",
            "2016,2017",
            "--during",
            "2018",
            "--format",
            "json",
        ]);
        assert_eq!(args.input, PathBuf::from("data.csv"));
        assert_eq!(args.pre, Some(vec![2016, 2017]));
        assert_eq!(args.during, Some(vec![2018]));
        assert_eq!(args.post, None);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_alpha_and_top() {
        let mut args = make_args();
        args.alpha = Some(0.0);
        assert!(args.validate().is_err());

        args.alpha = Some(0.01);
        assert!(args.validate().is_ok());

        args.top = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_directory_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = make_args();
        args.input = dir.path().to_path_buf();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
