//! Turning a raw [`Dataset`] into a [`CleanDataset`].
//!
//! The preprocessor runs in a fixed order:
//!
//! 1. Parse every value of the date column; drop rows that do not parse.
//! 2. Stable-sort the remaining rows by timestamp.
//! 3. Rewrite the date column as normalized timestamp text.
//! 4. Convert text columns holding numbers to `Float64`.
//! 5. Fill gaps in numeric columns: forward fill, then the column mean.
//!
//! The input dataset is never modified; a new frame is built.

mod dates;
mod fill;

pub use dates::{format_timestamps, parse_timestamp};
pub use fill::{FillOutcome, forward_fill_then_mean};

use crate::error::{PipelineError, Result, ResultExt};
use crate::types::{CleanDataset, CleaningReport, ColumnFill, Dataset};
use crate::utils::{
    is_numeric_dtype, is_numeric_text, parse_numeric_string, series_to_f64, series_to_strings,
};
use chrono::NaiveDateTime;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Cleans a raw table around a designated date column.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    date_column: String,
}

impl Preprocessor {
    pub fn new(date_column: impl Into<String>) -> Self {
        Self {
            date_column: date_column.into(),
        }
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    /// Produce the cleaned table.
    ///
    /// Fails with a configuration error when the date column is absent.
    /// Unparseable dates are not errors; those rows are dropped and counted.
    pub fn process(&self, dataset: &Dataset) -> Result<CleanDataset> {
        let date_column = self.date_column.as_str();
        if !dataset.has_column(date_column) {
            return Err(PipelineError::column_not_found(
                date_column,
                "Date",
                &dataset.column_names(),
            ));
        }

        let rows_before = dataset.height();
        let mut report = CleaningReport {
            rows_before,
            ..Default::default()
        };

        // Dates
        let raw_dates =
            series_to_strings(dataset.frame().column(date_column)?.as_materialized_series())?;
        let parsed: Vec<Option<NaiveDateTime>> = raw_dates
            .iter()
            .map(|value| value.as_deref().and_then(parse_timestamp))
            .collect();

        for (row, (raw, ts)) in raw_dates.iter().zip(&parsed).enumerate() {
            if ts.is_none() {
                debug!("Dropping row {}: unparseable date {:?}", row, raw);
            }
        }

        let mut order: Vec<usize> = (0..rows_before).filter(|&i| parsed[i].is_some()).collect();
        // sort_by_key is stable: same-timestamp rows keep their file order
        order.sort_by_key(|&i| parsed[i]);

        let timestamps: Vec<NaiveDateTime> = order.iter().filter_map(|&i| parsed[i]).collect();
        let rows_dropped = rows_before - timestamps.len();
        report.rows_dropped = rows_dropped;
        if rows_dropped > 0 {
            report.steps.push(format!(
                "Dropped {} row(s) with unparseable '{}' values",
                rows_dropped, date_column
            ));
        }
        report.steps.push(format!(
            "Sorted {} row(s) by '{}'",
            timestamps.len(),
            date_column
        ));

        let indices = IdxCa::from_vec(
            "idx".into(),
            order.iter().map(|&i| i as IdxSize).collect(),
        );
        let mut frame = dataset
            .frame()
            .take(&indices)
            .context("Reordering rows by date")?;
        frame
            .replace(
                date_column,
                Series::new(date_column.into(), format_timestamps(&timestamps)),
            )
            .context("Rewriting date column")?;

        // Numeric columns
        let schema: Vec<(String, DataType)> = frame
            .get_columns()
            .iter()
            .filter(|c| c.name().as_str() != date_column)
            .map(|c| (c.name().to_string(), c.dtype().clone()))
            .collect();

        let mut numeric_columns = Vec::new();
        for (name, dtype) in &schema {
            if is_numeric_dtype(dtype) {
                numeric_columns.push(name.clone());
            } else if matches!(dtype, DataType::String | DataType::Null) {
                let text = series_to_strings(frame.column(name)?.as_materialized_series())?;
                if is_numeric_text(&text) {
                    let values: Vec<Option<f64>> = text
                        .iter()
                        .map(|v| v.as_deref().and_then(parse_numeric_string))
                        .collect();
                    frame.replace(name, Series::new(name.as_str().into(), values))?;
                    debug!("Converted text column '{}' to Float64", name);
                    report.coerced_columns.push(name.clone());
                    report
                        .steps
                        .push(format!("Converted '{}' from text to numbers", name));
                    numeric_columns.push(name.clone());
                }
            }
        }

        // Gaps
        for name in &numeric_columns {
            let values = series_to_f64(frame.column(name)?.as_materialized_series())?;
            if values.iter().all(Option::is_some) {
                continue;
            }

            let outcome = forward_fill_then_mean(&Series::new(name.as_str().into(), values))
                .context(format!("Filling gaps in '{}'", name))?;
            if outcome.series.null_count() == outcome.series.len() {
                warn!("Column '{}' has no values; leaving it empty", name);
                report
                    .steps
                    .push(format!("Left '{}' empty: no values to fill from", name));
                frame.replace(name, outcome.series)?;
                continue;
            }

            debug!(
                "Filled '{}': {} forward, {} with mean {:?}",
                name, outcome.forward_filled, outcome.mean_filled, outcome.fill_mean
            );
            report.steps.push(fill_step(name, &outcome));
            report.fills.push(ColumnFill {
                column: name.clone(),
                forward_filled: outcome.forward_filled,
                mean_filled: outcome.mean_filled,
                fill_mean: outcome.fill_mean,
            });
            frame.replace(name, outcome.series)?;
        }

        report.rows_after = frame.height();
        info!(
            "Preprocessed {} -> {} rows ({} dropped), {} numeric columns, {} cells filled",
            rows_before,
            report.rows_after,
            rows_dropped,
            numeric_columns.len(),
            report.cells_filled()
        );
        if report.rows_after == 0 {
            warn!("No rows left after dropping unparseable dates");
        }

        Ok(CleanDataset {
            frame,
            timestamps,
            date_column: self.date_column.clone(),
            numeric_columns,
            report,
        })
    }
}

fn fill_step(column: &str, outcome: &FillOutcome) -> String {
    match outcome.fill_mean {
        Some(mean) if outcome.mean_filled > 0 => format!(
            "Filled '{}': {} forward, {} with mean {:.4}",
            column, outcome.forward_filled, outcome.mean_filled, mean
        ),
        _ => format!("Filled '{}': {} forward", column, outcome.forward_filled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn dataset(columns: Vec<Column>) -> Dataset {
        Dataset::new(DataFrame::new(columns).unwrap(), "test.csv")
    }

    fn scenario() -> Dataset {
        dataset(vec![
            Series::new("date".into(), &["2024-01-01", "2024-01-02", "2024-01-03"]).into(),
            Series::new("temperature".into(), &[Some(10i64), None, Some(14)]).into(),
            Series::new("humidity".into(), &[50i64, 55, 60]).into(),
            Series::new("rainfall".into(), &[0i64, 1, 0]).into(),
        ])
    }

    // ========================================================================
    // Date handling
    // ========================================================================

    #[test]
    fn test_missing_date_column_is_configuration_error() {
        let data = dataset(vec![Series::new("day".into(), &["2024-01-01"]).into()]);
        let err = Preprocessor::new("date").process(&data).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("'date'"));
    }

    #[test]
    fn test_unparseable_dates_dropped() {
        let data = dataset(vec![
            Series::new(
                "date".into(),
                &[Some("2024-01-01"), Some("garbage"), Some("2024-01-03"), None, Some("2024-01-05")],
            )
            .into(),
            Series::new("t".into(), &[1.0f64, 2.0, 3.0, 4.0, 5.0]).into(),
        ]);
        let clean = Preprocessor::new("date").process(&data).unwrap();

        assert_eq!(clean.height(), 3);
        assert_eq!(clean.report().rows_before, 5);
        assert_eq!(clean.report().rows_dropped, 2);
        assert_eq!(clean.observed_values("t").unwrap(), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_sort_is_stable() {
        let data = dataset(vec![
            Series::new("date".into(), &["2024-01-02", "2024-01-01", "2024-01-02", "2024-01-01"])
                .into(),
            Series::new("t".into(), &[1.0f64, 2.0, 3.0, 4.0]).into(),
        ]);
        let clean = Preprocessor::new("date").process(&data).unwrap();

        assert_eq!(clean.observed_values("t").unwrap(), vec![2.0, 4.0, 1.0, 3.0]);
        assert!(clean.timestamps().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_date_column_normalized() {
        let data = dataset(vec![
            Series::new("date".into(), &["2024/01/02", "20240101"]).into(),
            Series::new("t".into(), &[1.0f64, 2.0]).into(),
        ]);
        let clean = Preprocessor::new("date").process(&data).unwrap();

        let dates = series_to_strings(clean.frame().column("date").unwrap().as_materialized_series())
            .unwrap();
        assert_eq!(
            dates,
            vec![Some("2024-01-01".to_string()), Some("2024-01-02".to_string())]
        );
        assert_eq!(
            clean.timestamps()[0],
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_input_not_modified() {
        let data = scenario();
        let before = data.frame().clone();
        let _ = Preprocessor::new("date").process(&data).unwrap();
        assert!(data.frame().equals_missing(&before));
    }

    // ========================================================================
    // Missing values
    // ========================================================================

    #[test]
    fn test_scenario_forward_fill() {
        let clean = Preprocessor::new("date").process(&scenario()).unwrap();

        assert_eq!(
            clean.numeric_values("temperature").unwrap(),
            vec![Some(10.0), Some(10.0), Some(14.0)]
        );
        assert_eq!(
            clean.numeric_columns(),
            &["temperature".to_string(), "humidity".to_string(), "rainfall".to_string()]
        );
        assert_eq!(clean.report().fills.len(), 1);
        assert_eq!(clean.report().fills[0].forward_filled, 1);
    }

    #[test]
    fn test_only_gappy_columns_widened() {
        let clean = Preprocessor::new("date").process(&scenario()).unwrap();
        let frame = clean.frame();
        assert_eq!(frame.column("temperature").unwrap().dtype(), &DataType::Float64);
        assert_eq!(frame.column("humidity").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_leading_gap_after_sort() {
        // After sorting, the missing value moves to the front.
        let data = dataset(vec![
            Series::new("date".into(), &["2024-01-02", "2024-01-03", "2024-01-01"]).into(),
            Series::new("t".into(), &[Some(4.0f64), Some(8.0), None]).into(),
        ]);
        let clean = Preprocessor::new("date").process(&data).unwrap();

        assert_eq!(
            clean.numeric_values("t").unwrap(),
            vec![Some(6.0), Some(4.0), Some(8.0)]
        );
        assert_eq!(clean.report().fills[0].mean_filled, 1);
    }

    #[test]
    fn test_numeric_text_coerced() {
        let data = dataset(vec![
            Series::new("date".into(), &["2024-01-01", "2024-01-02", "2024-01-03"]).into(),
            Series::new("rain".into(), &["1.5", "NA", "2"]).into(),
            Series::new("station".into(), &["north", "north", "south"]).into(),
        ]);
        let clean = Preprocessor::new("date").process(&data).unwrap();

        assert_eq!(clean.numeric_columns(), &["rain".to_string()]);
        assert_eq!(clean.report().coerced_columns, vec!["rain".to_string()]);
        assert_eq!(
            clean.numeric_values("rain").unwrap(),
            vec![Some(1.5), Some(1.5), Some(2.0)]
        );
        assert_eq!(clean.frame().column("station").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_no_numeric_value_missing_after_clean() {
        let data = dataset(vec![
            Series::new("date".into(), &["2024-03-01", "2024-01-01", "2024-02-01", "2024-04-01"])
                .into(),
            Series::new("a".into(), &[None, Some(1.0f64), None, Some(3.0)]).into(),
            Series::new("b".into(), &[Some(2i64), None, None, Some(5)]).into(),
        ]);
        let clean = Preprocessor::new("date").process(&data).unwrap();

        for column in clean.numeric_columns() {
            let values = clean.numeric_values(column).unwrap();
            assert!(values.iter().all(Option::is_some), "{} has gaps", column);
        }
    }

    #[test]
    fn test_blank_text_column_kept_as_empty_numeric() {
        let data = dataset(vec![
            Series::new("date".into(), &["2024-01-01", "2024-01-02"]).into(),
            Series::new("t".into(), &[1.0f64, 2.0]).into(),
            Series::new("empty".into(), &[None::<&str>, None]).into(),
        ]);
        let clean = Preprocessor::new("date").process(&data).unwrap();

        assert_eq!(clean.numeric_columns(), &["t".to_string(), "empty".to_string()]);
        assert_eq!(clean.numeric_values("empty").unwrap(), vec![None, None]);
        assert_eq!(clean.frame().column("empty").unwrap().dtype(), &DataType::Float64);
        assert!(clean.report().fills.is_empty());
        assert!(
            clean
                .report()
                .steps
                .iter()
                .any(|s| s.contains("Left 'empty' empty"))
        );
    }

    #[test]
    fn test_fill_report_matches_filled_column() {
        let data = dataset(vec![
            Series::new("date".into(), &["2024-01-01", "2024-01-02", "2024-01-03"]).into(),
            Series::new("t".into(), &[None, Some(2.0f64), None]).into(),
        ]);
        let clean = Preprocessor::new("date").process(&data).unwrap();

        assert_eq!(
            clean.numeric_values("t").unwrap(),
            vec![Some(2.0), Some(2.0), Some(2.0)]
        );
        let fill = &clean.report().fills[0];
        assert_eq!(fill.column, "t");
        assert_eq!(fill.forward_filled, 1);
        assert_eq!(fill.mean_filled, 1);
        assert_eq!(fill.fill_mean, Some(2.0));
        assert!(clean.report().steps.iter().any(|s| s.starts_with("Filled 't'")));
    }

    #[test]
    fn test_all_dates_unparseable_gives_empty_table() {
        let data = dataset(vec![
            Series::new("date".into(), &["x", "y"]).into(),
            Series::new("t".into(), &[1.0f64, 2.0]).into(),
        ]);
        let clean = Preprocessor::new("date").process(&data).unwrap();
        assert_eq!(clean.height(), 0);
        assert!(clean.timestamps().is_empty());
    }
}
