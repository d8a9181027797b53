//! CLI entry point for the order cleaning pipeline.

use anyhow::Result;
use clap::Parser;
use order_cleaning::config::{DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH};
use order_cleaning::{
    CleaningConfig, CleaningResult, DataProfiler, Pipeline, ReportRenderer, load_dataset,
    save_dataset,
};
use std::path::PathBuf;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Cleans raw e-commerce order exports",
    long_about = "Loads a raw order CSV, cleans it, prints a data profile and writes the \
                  cleaned CSV.\n\n\
                  EXAMPLES:\n  \
                  # Default file names in the working directory\n  \
                  order-cleaning\n\n  \
                  # Explicit input and output\n  \
                  order-cleaning exports/orders.csv cleaned/orders.csv\n\n  \
                  # Machine-readable run report\n  \
                  order-cleaning orders.csv out.csv --json"
)]
struct Args {
    /// Path to the raw order CSV
    #[arg(default_value = DEFAULT_INPUT_PATH)]
    input: PathBuf,

    /// Path the cleaned CSV is written to
    #[arg(default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Drop orders whose total_amount lies more than this many standard
    /// deviations from the mean
    #[arg(long, default_value_t = 3.0)]
    outlier_std_threshold: f64,

    /// Keep rows whose customer_email is missing instead of dropping them
    #[arg(long)]
    keep_rows_without_email: bool,

    /// Label used for missing product categories and unmapped genders
    #[arg(long, default_value = "Unknown")]
    unknown_label: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Print the JSON run report to stdout instead of the text report
    #[arg(long)]
    json: bool,

    /// Also write the JSON run report to this path
    #[arg(short = 'r', long)]
    report: Option<PathBuf>,
}

/// Initialize the tracing subscriber for logging.
///
/// With `json_output` no subscriber is installed, so stdout only carries JSON.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = CleaningConfig::builder()
        .input_path(&args.input)
        .output_path(&args.output)
        .outlier_std_threshold(args.outlier_std_threshold)
        .keep_rows_without_email(args.keep_rows_without_email)
        .unknown_label(&args.unknown_label)
        .build()?;

    info!("Loading data from: {}", config.input_path.display());
    let data = match load_dataset(&config.input_path) {
        Ok(data) => data,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    let pipeline = build_pipeline(&args, config)?;
    let result = pipeline.process(data)?;

    handle_pipeline_output(result, pipeline.config(), &args)
}

fn build_pipeline(args: &Args, config: CleaningConfig) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            debug!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Print the reports, save the cleaned table and finish with the banner.
///
/// Output behavior:
/// - Default: text reports on stdout
/// - `--json`: the JSON run report on stdout only
/// - `--report`: the JSON run report written to a file as well
///
/// The `--report` file is written even when saving the table fails, so the
/// run's diagnostics survive a bad output path.
fn handle_pipeline_output(
    mut result: CleaningResult,
    config: &CleaningConfig,
    args: &Args,
) -> Result<()> {
    let profile = DataProfiler::profile(&result.data)?;

    if !args.json {
        println!("{}", ReportRenderer::render_summary(&result.summary));
        println!();
        println!("{}", ReportRenderer::render_validation(&result.validation));
        println!("{}", ReportRenderer::render_profile(&profile));
    }

    let saved = save_dataset(&mut result.data, &config.output_path);
    if let Err(e) = &saved {
        error!(
            "{} ({} rows cleaned, {} removed)",
            e, result.summary.rows_after, result.summary.rows_removed
        );
    }

    let report = (args.json || args.report.is_some()).then(|| {
        let output = saved.is_ok().then_some(config.output_path.as_path());
        ReportRenderer::build_report(&config.input_path, output, &result, &profile)
    });

    if let (Some(report), Some(path)) = (&report, &args.report) {
        let written = ReportRenderer::write_report_to_file(report, path)?;
        info!("Report written to: {}", written.display());
    }
    saved?;

    if args.json {
        if let Some(report) = &report {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        return Ok(());
    }

    println!();
    println!(
        "Cleaned data saved to: {}",
        config.output_path.display()
    );
    println!("{}", ReportRenderer::completion_banner());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_cleaning::CleaningReport;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_report_survives_failed_save() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("missing").join("cleaned.csv");
        let report_path = dir.path().join("report.json");
        let input = dir.path().join("raw.csv");
        let args = Args::parse_from([
            "order-cleaning",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--report",
            report_path.to_str().unwrap(),
        ]);

        let config = CleaningConfig::builder()
            .input_path(&args.input)
            .output_path(&args.output)
            .build()
            .unwrap();
        let df = df! {
            "order_id" => [1, 2],
            "total_amount" => [10.0, 12.0],
        }
        .unwrap();
        let pipeline = Pipeline::builder().config(config).build().unwrap();
        let result = pipeline.process(df).unwrap();

        let err = handle_pipeline_output(result, pipeline.config(), &args).unwrap_err();

        assert!(err.to_string().contains("cleaned.csv"));
        assert!(!output.exists());
        let report: CleaningReport =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(report.output_file, None);
        assert_eq!(report.summary.rows_after, 2);
    }
}
