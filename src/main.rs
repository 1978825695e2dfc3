//! ImpactScope - AI hiring rate comparison around a reference event
//!
//! A CLI tool that loads hiring rates by country, compares the periods
//! before, during and after an event, tests the difference for
//! significance and renders summary charts.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing input, bad config, parse failure, etc.)
//!   2 - Difference is significant and --fail-if-significant was given

mod analysis;
mod chart;
mod cli;
mod config;
mod dataset;
mod models;
mod report;

use analysis::{Period, PeriodWindows};
use anyhow::{bail, Context, Result};
use chart::ChartOptions;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use dataset::{Dataset, DatasetOptions};
use models::{ChartEntry, PeriodInfo, Report, ReportMetadata};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so [general] verbose applies
    let config = match load_config(&args, Path::new(".")) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&args, &config);

    info!("ImpactScope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    match run_analysis(args, config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .impactscope.toml.
fn handle_init_config() -> Result<()> {
    match write_default_config(Path::new(".")) {
        Ok(path) => {
            println!("✅ Created {} with default settings.", path.display());
            println!("   Edit it to customize periods, date format, alpha and charts.");
            Ok(())
        }
        Err(e) => {
            eprintln!("⚠️  {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Write the default configuration into `dir`, refusing to overwrite.
fn write_default_config(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE);

    if path.exists() {
        bail!(
            "{} already exists. Remove it first or edit it manually.",
            path.display()
        );
    }

    std::fs::write(&path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete analysis workflow. Returns exit code (0 or 2).
fn run_analysis(args: Args, mut config: Config) -> Result<i32> {
    let start_time = Instant::now();
    let verbose_output = !args.quiet;

    config.merge_with_args(&args);
    config.validate()?;

    // Step 1: Load and clean the data
    if verbose_output {
        println!("📥 Reading data from {}...", args.input.display());
    }
    let dataset = Dataset::load(&args.input, &DatasetOptions::from(&config.data))?;
    let summary = dataset.summary();
    info!(
        "Loaded {}: {} rows x {} countries ({} missing values)",
        dataset.source.display(),
        summary.rows,
        summary.countries,
        summary.missing_cells
    );

    let windows = config.periods.windows();
    let periods = period_infos(&dataset, &windows);
    for info in &periods {
        if info.rows == 0 {
            warn!("No rows fall in the {} period ({})", info.label, info.years);
        }
    }

    // Handle --dry-run: report the table shape and exit
    if args.dry_run {
        return handle_dry_run(&dataset, &periods);
    }

    // Step 2: Aggregate and test
    if verbose_output {
        println!("📊 Calculating statistics for different periods...");
    }
    let analysis = analysis::analyze(&dataset, &windows, config.analysis.alpha)?;
    let significant = analysis.significance.significant;

    // Step 3: Charts
    let charts = if config.charts.enabled {
        if verbose_output {
            println!("\n🎨 Generating visualizations...");
        }
        let options = ChartOptions {
            output_dir: PathBuf::from(&config.general.output_dir),
            width: config.charts.width,
            height: config.charts.height,
            top_n: config.analysis.chart_top_n,
            annotate_threshold: config.analysis.annotate_threshold,
            show_progress: verbose_output,
        };
        let rendered = chart::render_all(&analysis, &options)?;

        if verbose_output {
            println!(
                "\nVisualizations have been saved as SVG files in {}:",
                options.output_dir.display()
            );
            for (i, chart) in rendered.iter().enumerate() {
                println!(
                    "{}. {} - {}",
                    i + 1,
                    chart.kind.file_name(),
                    chart.description
                );
            }
        }

        rendered
            .into_iter()
            .map(|c| ChartEntry {
                file: c.path.display().to_string(),
                description: c.description,
            })
            .collect()
    } else {
        debug!("Chart rendering disabled");
        Vec::new()
    };

    // Step 4: Console summary
    report::print_summary(&analysis, config.analysis.top_n)
        .context("Failed to write summary to stdout")?;

    // Step 5: Optional report file
    if let Some(ref path) = args.report {
        let mut metadata = ReportMetadata::new(args.input.display().to_string(), &summary, periods);
        metadata.duration_seconds = start_time.elapsed().as_secs_f64();

        let report = Report {
            metadata,
            analysis,
            charts,
            top_n: config.analysis.top_n,
        };

        let output = match args.format {
            OutputFormat::Json => report::generate_json_report(&report)?,
            OutputFormat::Markdown => report::generate_markdown_report(&report),
        };
        std::fs::write(path, &output)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        if verbose_output {
            println!("\n📝 Report saved to: {}", path.display());
        }
    }

    Ok(exit_code(&args, significant))
}

/// Exit code 2 when a significant result should fail the run.
fn exit_code(args: &Args, significant: bool) -> i32 {
    if args.fail_if_significant && significant {
        eprintln!("\n⛔ Pre/during difference is significant. Failing (exit code 2).");
        2
    } else {
        0
    }
}

/// Rows and years for each period.
fn period_infos(dataset: &Dataset, windows: &PeriodWindows) -> Vec<PeriodInfo> {
    Period::ALL
        .iter()
        .map(|&period| PeriodInfo {
            period,
            label: period.label().to_string(),
            years: windows.describe(period),
            rows: dataset.rows_in_years(windows.years(period)).len(),
        })
        .collect()
}

/// Handle --dry-run: print what would be analyzed, exit.
fn handle_dry_run(dataset: &Dataset, periods: &[PeriodInfo]) -> Result<i32> {
    let summary = dataset.summary();

    println!("\n🔍 Dry run: data loaded, no analysis performed\n");
    println!("   Rows: {}", summary.rows);
    println!("   Countries: {}", summary.countries);
    for name in dataset.countries() {
        println!("     🌍 {}", name);
    }
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        println!("   Dates: {} to {}", first, last);
    }
    println!("   Missing values: {}", summary.missing_cells);

    println!();
    for info in periods {
        println!("   {} ({}): {} rows", info.label, info.years, info.rows);
    }

    println!("\n✅ Dry run complete.");
    Ok(0)
}

/// Load configuration from `--config`, else from `CONFIG_FILE` in `dir`, else defaults.
fn load_config(args: &Args, dir: &Path) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location; a file that exists must parse
    let config = Config::load_from_dir(dir)
        .with_context(|| format!("Invalid {} in {}", CONFIG_FILE, dir.display()))?;
    Ok(config.unwrap_or_default())
}
