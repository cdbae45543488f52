//! CLI entry point for the weather analysis pipeline.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use weather_insights::{Pipeline, PipelineConfig, PipelineOutcome, SeasonMap};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Weather dataset cleaning, statistics and seasonal summaries",
    long_about = "Cleans a weather observation table, computes global and daily \
                  statistics, aggregates by season and writes the results.\n\n\
                  EXAMPLES:\n  \
                  # Tables and report only\n  \
                  weather-insights -i weather.csv\n\n  \
                  # With charts, into a custom directory\n  \
                  weather-insights -i weather.csv -o results/ --save-plots\n\n  \
                  # Southern-hemisphere seasons\n  \
                  weather-insights -i weather.csv --season-map seasons.json"
)]
struct Args {
    /// Path to the input CSV (e.g. weather.csv)
    #[arg(short, long)]
    input: PathBuf,

    /// Directory to save outputs
    #[arg(short, long, default_value = "outputs")]
    outdir: PathBuf,

    /// Render the charts as SVG files
    #[arg(long)]
    save_plots: bool,

    /// Name of the date column
    #[arg(long, default_value = "date")]
    date_col: String,

    /// Name of the temperature column
    #[arg(long, default_value = "temperature")]
    temp_col: String,

    /// Name of the humidity column
    #[arg(long, default_value = "humidity")]
    hum_col: String,

    /// Name of the rainfall/precipitation column
    #[arg(long, default_value = "rainfall")]
    rain_col: String,

    /// JSON file mapping month numbers ("1".."12") to Winter/Spring/Summer/Autumn
    #[arg(long)]
    season_map: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only show warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Write run_summary.json to the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Print the run summary as JSON to stdout instead of logs
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled so stdout only carries
/// the JSON summary.
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

    let mut builder = PipelineConfig::builder()
        .input_path(&args.input)
        .output_dir(&args.outdir)
        .generate_plots(args.save_plots)
        .date_column(&args.date_col)
        .temperature_column(&args.temp_col)
        .humidity_column(&args.hum_col)
        .rainfall_column(&args.rain_col)
        .emit_run_summary(args.emit_report);

    if let Some(path) = &args.season_map {
        builder = builder.season_map(SeasonMap::from_json_file(path)?);
        info!("Using season map from {}", path.display());
    }

    let config = builder.build()?;
    let outcome = match Pipeline::new(config).run() {
        Ok(outcome) => outcome,
        Err(e) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            return Err(e.into());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.summary)?);
    } else if !args.quiet {
        print_summary(&outcome, &args);
    }

    if !args.json {
        println!("Done.");
    }
    Ok(())
}

/// Human-readable run summary.
///
/// Uses `println!` so the summary shows regardless of the log level.
fn print_summary(outcome: &PipelineOutcome, args: &Args) {
    let summary = &outcome.summary;

    println!();
    println!("{}", "=".repeat(60));
    println!("WEATHER ANALYSIS COMPLETE");
    println!("{}", "=".repeat(60));
    println!();
    println!("Input: {}", summary.input_file);
    println!(
        "Rows: {} -> {} ({} dropped for unparseable dates)",
        summary.raw_shape.0, summary.cleaned_shape.0, summary.rows_dropped
    );
    println!("Numeric columns: {}", summary.numeric_columns.join(", "));
    if !summary.coerced_columns.is_empty() {
        println!("Converted from text: {}", summary.coerced_columns.join(", "));
    }
    if outcome.cleaning.cells_filled() > 0 {
        println!("Filled cells: {}", outcome.cleaning.cells_filled());
    }
    println!("Days: {}", summary.day_groups);
    println!("Seasons: {}", summary.seasons.join(", "));
    println!();

    println!("Files written to {}:", args.outdir.display());
    for file in &summary.files_written {
        println!("  - {}", file);
    }
    println!();
}
