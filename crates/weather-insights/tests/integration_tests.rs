//! Integration tests for the weather analysis pipeline.
//!
//! These tests run the whole pipeline against fixture files and inspect what
//! lands in the output directory.

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use weather_insights::{
    DatasetLoader, Pipeline, PipelineConfig, PipelineOutcome, Preprocessor, RunSummary, Season,
    SeasonMap, SeasonalAggregator, Statistic,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(path: &Path) -> DataFrame {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn config(fixture: &str, out: &Path) -> PipelineConfig {
    PipelineConfig::builder()
        .input_path(fixtures_path().join(fixture))
        .output_dir(out)
        .build()
        .expect("valid config")
}

fn run(config: PipelineConfig) -> PipelineOutcome {
    Pipeline::new(config).run().expect("pipeline should succeed")
}

fn read_dir_sorted(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            (
                entry.file_name().to_string_lossy().into_owned(),
                fs::read(entry.path()).unwrap(),
            )
        })
        .collect()
}

const TABLE_FILES: [&str; 5] = [
    "daily_resampled.csv",
    "seasonal_aggregation.csv",
    "summary_report.txt",
    "summary_stats.csv",
    "weather_cleaned.csv",
];

const CHART_FILES: [&str; 4] = [
    "combined_plots.svg",
    "daily_temperature.svg",
    "humidity_vs_temp.svg",
    "monthly_rainfall.svg",
];

// ============================================================================
// Small Scenario
// ============================================================================

#[test]
fn test_scenario_forward_fill_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let outcome = run(config("scenario.csv", &out));

    let cleaned = load_csv(&out.join("weather_cleaned.csv"));
    let temperature = cleaned.column("temperature").unwrap().f64().unwrap().clone();
    assert_eq!(temperature.get(1), Some(10.0));
    assert_eq!(temperature.null_count(), 0);

    let t = outcome.statistics.column("temperature").unwrap();
    assert_eq!(t.count, 3);

    assert_eq!(outcome.daily.len(), 3);
    for day in outcome.daily.groups() {
        assert_eq!(outcome.daily.get(day, "temperature", Statistic::Std), None);
    }
}

#[test]
fn test_scenario_writes_expected_files() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested/out");
    let outcome = run(config("scenario.csv", &out));

    let written: Vec<String> = read_dir_sorted(&out).into_keys().collect();
    assert_eq!(written, TABLE_FILES.to_vec());
    assert_eq!(outcome.files.len(), TABLE_FILES.len());
}

#[test]
fn test_summary_stats_csv_layout() {
    let dir = tempfile::tempdir().unwrap();
    run(config("scenario.csv", dir.path()));

    let summary = load_csv(&dir.path().join("summary_stats.csv"));
    assert_eq!(
        summary
            .get_column_names()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>(),
        vec!["statistic", "temperature", "humidity", "rainfall"]
    );
    let labels: Vec<Option<&str>> = summary
        .column("statistic")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(
        labels,
        ["count", "mean", "std", "min", "25%", "50%", "75%", "max"]
            .map(Some)
            .to_vec()
    );
}

// ============================================================================
// Dropped Rows and Errors
// ============================================================================

#[test]
fn test_unparseable_date_dropped_silently() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = run(config("bad_dates.csv", dir.path()));

    assert_eq!(outcome.summary.raw_shape, (5, 4));
    assert_eq!(outcome.summary.cleaned_shape, (4, 4));
    assert_eq!(outcome.summary.rows_dropped, 1);

    let cleaned = load_csv(&dir.path().join("weather_cleaned.csv"));
    assert_eq!(cleaned.height(), 4);
}

#[test]
fn test_missing_date_column_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let err = Pipeline::new(config("no_date_column.csv", &out))
        .run()
        .unwrap_err();

    assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    assert!(err.to_string().contains("'date'"));
    assert!(!out.exists(), "no output directory on configuration error");
}

#[test]
fn test_missing_plot_column_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let config = PipelineConfig::builder()
        .input_path(fixtures_path().join("scenario.csv"))
        .output_dir(&out)
        .generate_plots(true)
        .rainfall_column("precip")
        .build()
        .unwrap();

    let err = Pipeline::new(config).run().unwrap_err();
    assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    assert!(!out.exists());
}

#[test]
fn test_missing_plot_column_ignored_without_plots() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::builder()
        .input_path(fixtures_path().join("scenario.csv"))
        .output_dir(dir.path())
        .rainfall_column("precip")
        .build()
        .unwrap();
    assert!(Pipeline::new(config).run().is_ok());
}

#[test]
fn test_missing_input_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let err = Pipeline::new(config("does_not_exist.csv", &out))
        .run()
        .unwrap_err();
    assert_eq!(err.error_code(), "INPUT_ERROR");
    assert!(!out.exists());
}

#[test]
fn test_output_dir_blocked_by_file_is_output_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("outputs");
    fs::write(&out, "not a directory").unwrap();

    let err = Pipeline::new(config("scenario.csv", &out))
        .run()
        .unwrap_err();

    assert_eq!(err.error_code(), "OUTPUT_ERROR");
    assert_eq!(fs::read_to_string(&out).unwrap(), "not a directory");
}

#[test]
fn test_output_dir_under_file_is_output_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let err = Pipeline::new(config("scenario.csv", &blocker.join("out")))
        .run()
        .unwrap_err();
    assert_eq!(err.error_code(), "OUTPUT_ERROR");
}

// ============================================================================
// Unusual Columns
// ============================================================================

fn write_input(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("input.csv");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_column_named_statistic_is_summarized() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "date,statistic,temperature\n2024-01-01,1,10\n2024-01-02,2,11\n",
    );
    let out = dir.path().join("out");
    let config = PipelineConfig::builder()
        .input_path(&input)
        .output_dir(&out)
        .build()
        .unwrap();
    run(config);

    let content = fs::read_to_string(out.join("summary_stats.csv")).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("_statistic,statistic,temperature"));
    assert_eq!(lines.next(), Some("count,2.0,2.0"));
}

#[test]
fn test_blank_column_kept_with_zero_count() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "date,temperature,empty\n2024-01-01,10,\n2024-01-02,11,\n",
    );
    let out = dir.path().join("out");
    let config = PipelineConfig::builder()
        .input_path(&input)
        .output_dir(&out)
        .build()
        .unwrap();
    let outcome = run(config);

    assert_eq!(
        outcome.summary.numeric_columns,
        vec!["temperature".to_string(), "empty".to_string()]
    );
    let empty = outcome.statistics.column("empty").unwrap();
    assert_eq!(empty.count, 0);
    assert_eq!(empty.mean, None);

    let content = fs::read_to_string(out.join("summary_stats.csv")).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("statistic,temperature,empty"));
    assert_eq!(lines.next(), Some("count,2.0,0.0"));
    assert!(
        outcome
            .cleaning
            .steps
            .iter()
            .any(|s| s.contains("Left 'empty' empty"))
    );
}

// ============================================================================
// Charts
// ============================================================================

#[test]
fn test_plots_enabled_writes_charts() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config("weather_2023.csv", dir.path());
    config.generate_plots = true;
    let outcome = run(config);

    let written = read_dir_sorted(dir.path());
    for chart in CHART_FILES {
        let bytes = written.get(chart).unwrap_or_else(|| panic!("{} missing", chart));
        assert!(String::from_utf8_lossy(bytes).starts_with("<svg"));
    }
    assert!(outcome.summary.plots_generated);
}

#[test]
fn test_plots_disabled_writes_no_charts() {
    let dir = tempfile::tempdir().unwrap();
    run(config("weather_2023.csv", dir.path()));

    let written = read_dir_sorted(dir.path());
    assert!(written.keys().all(|name| !name.ends_with(".svg")));
}

// ============================================================================
// Full Year Dataset
// ============================================================================

#[test]
fn test_year_cleaned_is_sorted_and_complete() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = run(config("weather_2023.csv", dir.path()));

    let cleaned = load_csv(&dir.path().join("weather_cleaned.csv"));
    assert_eq!(cleaned.height(), 48);

    let dates: Vec<String> = cleaned
        .column("date")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|d| d.unwrap().to_string())
        .collect();
    assert!(dates.windows(2).all(|w| w[0] <= w[1]), "dates not sorted");
    assert_eq!(dates[0], "2023-01-01 06:00:00");

    for column in &outcome.summary.numeric_columns {
        assert_eq!(
            cleaned.column(column).unwrap().null_count(),
            0,
            "{} has gaps",
            column
        );
    }
    assert!(cleaned.column("station").is_ok(), "text columns are kept");
}

#[test]
fn test_year_coerces_marker_column() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = run(config("weather_2023.csv", dir.path()));

    assert_eq!(outcome.summary.coerced_columns, vec!["rainfall".to_string()]);
    assert_eq!(
        outcome.summary.numeric_columns,
        vec![
            "temperature".to_string(),
            "humidity".to_string(),
            "rainfall".to_string()
        ]
    );
}

#[test]
fn test_year_daily_groups() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = run(config("weather_2023.csv", dir.path()));

    // Two readings on the 1st and 15th of every month
    assert_eq!(outcome.daily.len(), 24);
    assert!(outcome.daily.groups().windows(2).all(|w| w[0] < w[1]));

    let daily = load_csv(&dir.path().join("daily_resampled.csv"));
    assert_eq!(daily.height(), 24);
    assert_eq!(daily.get_column_names()[0].as_str(), "date");
    assert!(daily.column("humidity_std").is_ok());
}

#[test]
fn test_year_seasons_in_canonical_order() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = run(config("weather_2023.csv", dir.path()));

    assert_eq!(
        outcome.seasonal.groups(),
        &[Season::Winter, Season::Spring, Season::Summer, Season::Autumn]
    );
    let winter = outcome
        .seasonal
        .get(&Season::Winter, "temperature", Statistic::Mean)
        .unwrap();
    let summer = outcome
        .seasonal
        .get(&Season::Summer, "temperature", Statistic::Mean)
        .unwrap();
    assert!(summer > winter);

    let seasonal = load_csv(&dir.path().join("seasonal_aggregation.csv"));
    let labels: Vec<Option<&str>> = seasonal
        .column("season")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(
        labels,
        vec![Some("Winter"), Some("Spring"), Some("Summer"), Some("Autumn")]
    );
}

#[test]
fn test_custom_season_map() {
    let southern = r#"{
        "1": "Summer", "2": "Summer", "3": "Autumn", "4": "Autumn",
        "5": "Autumn", "6": "Winter", "7": "Winter", "8": "Winter",
        "9": "Spring", "10": "Spring", "11": "Spring", "12": "Summer"
    }"#;
    let map = SeasonMap::from_json_str(southern).unwrap();

    let raw = DatasetLoader
        .load(&fixtures_path().join("weather_2023.csv"))
        .unwrap();
    let clean = Preprocessor::new("date").process(&raw).unwrap();

    let northern = SeasonalAggregator::default().aggregate(&clean).unwrap();
    let flipped = SeasonalAggregator::new(map).aggregate(&clean).unwrap();

    assert_eq!(
        flipped.get(&Season::Summer, "temperature", Statistic::Mean),
        northern.get(&Season::Winter, "temperature", Statistic::Mean)
    );
}

// ============================================================================
// Idempotence and Run Summary
// ============================================================================

#[test]
fn test_rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config("weather_2023.csv", dir.path());
    config.generate_plots = true;
    config.emit_run_summary = true;

    run(config.clone());
    let first = read_dir_sorted(dir.path());
    run(config);
    let second = read_dir_sorted(dir.path());

    assert_eq!(first.len(), TABLE_FILES.len() + CHART_FILES.len() + 1);
    for (name, bytes) in &first {
        assert!(second.get(name) == Some(bytes), "{} changed between runs", name);
    }
}

#[test]
fn test_run_summary_json_matches_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config("bad_dates.csv", dir.path());
    config.emit_run_summary = true;
    let outcome = run(config);

    let content = fs::read_to_string(dir.path().join("run_summary.json")).unwrap();
    let parsed: RunSummary = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed, outcome.summary);
    assert_eq!(parsed.seasons, vec!["Spring".to_string()]);
}

#[test]
fn test_input_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixtures_path().join("weather_2023.csv");
    let before = fs::read(&input).unwrap();
    run(config("weather_2023.csv", dir.path()));
    assert_eq!(fs::read(&input).unwrap(), before);
}
