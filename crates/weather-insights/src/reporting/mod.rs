//! Writing run outputs.
//!
//! [`Exporter`] owns the output directory and writes every artifact of a run:
//! the cleaned table, the statistics tables, the plain-text summary report
//! and, on request, the JSON run summary. Every file is replaced on re-run.
//!
//! # Example
//!
//! ```rust,ignore
//! use weather_insights::reporting::Exporter;
//!
//! let exporter = Exporter::new("outputs");
//! exporter.ensure_output_dir()?;
//! exporter.write_summary(&summary)?;
//! exporter.write_report(&summary, &seasonal)?;
//! ```

mod text;

pub use text::render_report;

use crate::error::{PipelineError, Result, ResultExt};
use crate::seasons::SeasonalAggregate;
use crate::types::{
    CleanDataset, ColumnSummary, DailyResample, GroupedStatistics, RunSummary, StatKey,
    SummaryStatistics,
};
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CLEANED_FILE: &str = "weather_cleaned.csv";
pub const SUMMARY_FILE: &str = "summary_stats.csv";
pub const DAILY_FILE: &str = "daily_resampled.csv";
pub const SEASONAL_FILE: &str = "seasonal_aggregation.csv";
pub const REPORT_FILE: &str = "summary_report.txt";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// Writes run artifacts into one directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory and any missing parents.
    pub fn ensure_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| PipelineError::output(&self.output_dir, e))
    }

    /// Cleaned table with its full schema, no index column.
    pub fn write_cleaned(&self, data: &CleanDataset) -> Result<PathBuf> {
        let mut frame = data.frame().clone();
        self.write_csv(CLEANED_FILE, &mut frame)
    }

    /// One row per statistic, one column per numeric column.
    pub fn write_summary(&self, summary: &SummaryStatistics) -> Result<PathBuf> {
        let mut frame = summary_frame(summary)?;
        self.write_csv(SUMMARY_FILE, &mut frame)
    }

    /// One row per day, one `<column>_<statistic>` column per key.
    pub fn write_daily(&self, daily: &DailyResample) -> Result<PathBuf> {
        let mut frame = grouped_frame("date", daily, |day| day.format("%Y-%m-%d").to_string())?;
        self.write_csv(DAILY_FILE, &mut frame)
    }

    /// One row per season, one `<column>_<statistic>` column per key.
    pub fn write_seasonal(&self, seasonal: &SeasonalAggregate) -> Result<PathBuf> {
        let mut frame = grouped_frame("season", seasonal, |season| season.to_string())?;
        self.write_csv(SEASONAL_FILE, &mut frame)
    }

    /// Plain-text summary of the global and seasonal statistics.
    pub fn write_report(
        &self,
        summary: &SummaryStatistics,
        seasonal: &SeasonalAggregate,
    ) -> Result<PathBuf> {
        let path = self.output_dir.join(REPORT_FILE);
        fs::write(&path, render_report(summary, seasonal))
            .map_err(|e| PipelineError::output(&path, e))?;
        info!("Report saved: {}", path.display());
        Ok(path)
    }

    /// Pretty-printed JSON record of the run.
    pub fn write_run_summary(&self, run: &RunSummary) -> Result<PathBuf> {
        let path = self.output_dir.join(RUN_SUMMARY_FILE);
        let json = serde_json::to_string_pretty(run)?;
        let mut file = File::create(&path).map_err(|e| PipelineError::output(&path, e))?;
        writeln!(file, "{}", json).map_err(|e| PipelineError::output(&path, e))?;
        info!("Run summary saved: {}", path.display());
        Ok(path)
    }

    fn write_csv(&self, file_name: &str, frame: &mut DataFrame) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        let mut file = File::create(&path).map_err(|e| PipelineError::output(&path, e))?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(frame)
            .map_err(|e| PipelineError::output(&path, std::io::Error::other(e.to_string())))?;

        info!("Dataset saved: {}", path.display());
        Ok(path)
    }
}

/// Header for a table's label column: `preferred`, prefixed with underscores
/// until it differs from every data column name.
fn index_header<'a>(preferred: &str, taken: impl Iterator<Item = &'a str> + Clone) -> String {
    let mut header = preferred.to_string();
    while taken.clone().any(|name| name == header) {
        header.insert(0, '_');
    }
    header
}

fn summary_frame(summary: &SummaryStatistics) -> Result<DataFrame> {
    let header = index_header("statistic", summary.columns.iter().map(|c| c.column.as_str()));
    let mut columns: Vec<Column> =
        vec![Series::new(header.into(), ColumnSummary::ROWS.as_slice()).into()];
    for column in &summary.columns {
        let values = column.values().to_vec();
        columns.push(Series::new(column.column.as_str().into(), values).into());
    }
    DataFrame::new(columns).context("Building summary table")
}

fn grouped_frame<G: PartialEq>(
    index: &str,
    table: &GroupedStatistics<G>,
    label: impl Fn(&G) -> String,
) -> Result<DataFrame> {
    let flat_names: Vec<String> = table.keys().iter().map(StatKey::flat_name).collect();
    let header = index_header(index, flat_names.iter().map(String::as_str));
    let labels: Vec<String> = table.groups().iter().map(label).collect();
    let mut columns: Vec<Column> = vec![Series::new(header.into(), labels).into()];

    for (k, name) in flat_names.iter().enumerate() {
        let values: Vec<Option<f64>> = table.rows().map(|(_, cells)| cells[k]).collect();
        columns.push(Series::new(name.as_str().into(), values).into());
    }
    DataFrame::new(columns).context(format!("Building {} table", index))
}
