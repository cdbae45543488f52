use crate::error::{PipelineError, Result};
use crate::utils::{present, sample_std, series_to_f64};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// Datasets
// ============================================================================

/// A raw table as read from disk, with its original column schema.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    source: PathBuf,
}

impl Dataset {
    pub fn new(frame: DataFrame, source: impl Into<PathBuf>) -> Self {
        Self {
            frame,
            source: source.into(),
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        column_names(&self.frame)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }
}

/// The cleaned table produced by the preprocessor.
///
/// Rows are sorted ascending by `timestamps`, which holds one parsed value per
/// row. Numeric columns contain no missing values, except a column that had
/// no values at all, which stays entirely missing.
#[derive(Debug, Clone)]
pub struct CleanDataset {
    pub(crate) frame: DataFrame,
    pub(crate) timestamps: Vec<NaiveDateTime>,
    pub(crate) date_column: String,
    pub(crate) numeric_columns: Vec<String>,
    pub(crate) report: CleaningReport,
}

impl CleanDataset {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    /// Numeric columns in schema order, excluding the date column.
    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn report(&self) -> &CleaningReport {
        &self.report
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        column_names(&self.frame)
    }

    /// A numeric column as a `Float64` series in row order.
    pub fn numeric_series(&self, column: &str) -> Result<Series> {
        if !self.numeric_columns.iter().any(|c| c == column) {
            return Err(PipelineError::column_not_found(
                column,
                "Numeric",
                &self.numeric_columns,
            ));
        }
        let col = self.frame.column(column)?;
        Ok(col.as_materialized_series().cast(&DataType::Float64)?)
    }

    /// Values of a numeric column in row order.
    pub fn numeric_values(&self, column: &str) -> Result<Vec<Option<f64>>> {
        Ok(series_to_f64(&self.numeric_series(column)?)?)
    }

    /// Present values of a numeric column in row order.
    pub fn observed_values(&self, column: &str) -> Result<Vec<f64>> {
        Ok(present(&self.numeric_values(column)?))
    }
}

pub(crate) fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// ============================================================================
// Cleaning Report
// ============================================================================

/// What the preprocessor did to the raw table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    /// Rows discarded because their date could not be parsed.
    pub rows_dropped: usize,
    /// Text columns converted to numbers.
    pub coerced_columns: Vec<String>,
    pub fills: Vec<ColumnFill>,
    /// Human-readable log of every step, in order.
    pub steps: Vec<String>,
}

impl CleaningReport {
    /// Total number of cells filled across all columns.
    pub fn cells_filled(&self) -> usize {
        self.fills
            .iter()
            .map(|f| f.forward_filled + f.mean_filled)
            .sum()
    }
}

/// Missing-value fill applied to one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFill {
    pub column: String,
    pub forward_filled: usize,
    pub mean_filled: usize,
    /// Mean used for leading gaps, if any were filled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_mean: Option<f64>,
}

// ============================================================================
// Statistics
// ============================================================================

/// Per-group statistic computed by the resample and seasonal stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Mean,
    Median,
    Min,
    Max,
    Std,
}

impl Statistic {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
            Self::Std => "std",
        }
    }

    /// Compute this statistic over the present values of `values`.
    pub fn compute(&self, values: &Float64Chunked) -> Option<f64> {
        match self {
            Self::Mean => values.mean(),
            Self::Median => values.median(),
            Self::Min => values.min(),
            Self::Max => values.max(),
            Self::Std => sample_std(values),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Composite `(column, statistic)` key of a multi-level table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatKey {
    pub column: String,
    pub statistic: Statistic,
}

impl StatKey {
    pub fn new(column: impl Into<String>, statistic: Statistic) -> Self {
        Self {
            column: column.into(),
            statistic,
        }
    }

    /// Flattened header used in delimited exports, e.g. `temperature_mean`.
    pub fn flat_name(&self) -> String {
        format!("{}_{}", self.column, self.statistic)
    }
}

/// A table of statistics with one row per group and one cell per [`StatKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedStatistics<G> {
    groups: Vec<G>,
    keys: Vec<StatKey>,
    cells: Vec<Vec<Option<f64>>>,
}

impl<G: PartialEq> GroupedStatistics<G> {
    /// Compute `statistics` for every column within every group.
    ///
    /// `groups` pairs each group label with the row indices it covers; group
    /// order is preserved. `columns` are `Float64` series sharing one row
    /// order. Missing values are skipped.
    pub fn compute(
        groups: Vec<(G, Vec<IdxSize>)>,
        columns: &[Series],
        statistics: &[Statistic],
    ) -> Result<Self> {
        let keys: Vec<StatKey> = columns
            .iter()
            .flat_map(|column| {
                statistics
                    .iter()
                    .map(move |s| StatKey::new(column.name().as_str(), *s))
            })
            .collect();

        let mut labels = Vec::with_capacity(groups.len());
        let mut cells = Vec::with_capacity(groups.len());

        for (label, rows) in groups {
            let indices = IdxCa::from_vec("idx".into(), rows);
            let mut row = Vec::with_capacity(keys.len());
            for column in columns {
                let members = column.take(&indices)?;
                let members = members.f64()?;
                for statistic in statistics {
                    row.push(statistic.compute(members));
                }
            }
            labels.push(label);
            cells.push(row);
        }

        Ok(Self {
            groups: labels,
            keys,
            cells,
        })
    }

    pub fn groups(&self) -> &[G] {
        &self.groups
    }

    pub fn keys(&self) -> &[StatKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate `(group, cells)` in group order.
    pub fn rows(&self) -> impl Iterator<Item = (&G, &[Option<f64>])> {
        self.groups
            .iter()
            .zip(self.cells.iter().map(Vec::as_slice))
    }

    /// Look up one cell. Returns `None` for unknown keys or undefined values.
    pub fn get(&self, group: &G, column: &str, statistic: Statistic) -> Option<f64> {
        let row = self.groups.iter().position(|g| g == group)?;
        let col = self
            .keys
            .iter()
            .position(|k| k.column == column && k.statistic == statistic)?;
        self.cells[row][col]
    }
}

/// Daily resample: one group per calendar day present in the data.
pub type DailyResample = GroupedStatistics<NaiveDate>;

/// Descriptive statistics of one numeric column over the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    /// Row labels in export order.
    pub const ROWS: [&'static str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    /// Values in the same order as [`ColumnSummary::ROWS`].
    pub fn values(&self) -> [Option<f64>; 8] {
        [
            Some(self.count as f64),
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

/// Global descriptive statistics, one entry per numeric column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub columns: Vec<ColumnSummary>,
}

impl SummaryStatistics {
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.column == name)
    }
}

// ============================================================================
// Run Summary
// ============================================================================

/// Serializable record of one pipeline run.
///
/// Holds no wall-clock data, so identical inputs give identical summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub input_file: String,
    pub raw_shape: (usize, usize),
    pub cleaned_shape: (usize, usize),
    pub rows_dropped: usize,
    pub numeric_columns: Vec<String>,
    pub coerced_columns: Vec<String>,
    pub fills: Vec<ColumnFill>,
    pub day_groups: usize,
    pub seasons: Vec<String>,
    pub plots_generated: bool,
    pub files_written: Vec<String>,
}
