//! Global descriptive statistics and the daily resample.

use crate::error::Result;
use crate::types::{CleanDataset, ColumnSummary, DailyResample, GroupedStatistics, Statistic, SummaryStatistics};
use crate::utils::sample_std;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Statistics computed for each calendar day.
pub const DAILY_STATISTICS: [Statistic; 4] =
    [Statistic::Mean, Statistic::Min, Statistic::Max, Statistic::Std];

/// Computes statistics over a [`CleanDataset`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsEngine;

impl StatsEngine {
    /// Describe every numeric column: count, mean, std, min, quartiles, max.
    pub fn summarize(&self, data: &CleanDataset) -> Result<SummaryStatistics> {
        let columns = data
            .numeric_columns()
            .iter()
            .map(|name| {
                let series = data.numeric_series(name)?;
                Ok(describe(name, series.f64()?)?)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Summarized {} numeric columns", columns.len());
        Ok(SummaryStatistics { columns })
    }

    /// Group records by calendar day and compute mean/min/max/std per day.
    ///
    /// Only days holding at least one record appear, in ascending order.
    pub fn resample_daily(&self, data: &CleanDataset) -> Result<DailyResample> {
        let mut days: BTreeMap<NaiveDate, Vec<IdxSize>> = BTreeMap::new();
        for (row, ts) in data.timestamps().iter().enumerate() {
            days.entry(ts.date()).or_default().push(row as IdxSize);
        }

        let columns = data
            .numeric_columns()
            .iter()
            .map(|c| data.numeric_series(c))
            .collect::<Result<Vec<_>>>()?;

        let resample =
            GroupedStatistics::compute(days.into_iter().collect(), &columns, &DAILY_STATISTICS)?;
        info!(
            "Daily resample: {} days x {} columns",
            resample.len(),
            columns.len()
        );
        Ok(resample)
    }
}

/// Quartiles use linear interpolation between the closest ranks.
fn describe(column: &str, values: &Float64Chunked) -> PolarsResult<ColumnSummary> {
    Ok(ColumnSummary {
        column: column.to_string(),
        count: values.len() - values.null_count(),
        mean: values.mean(),
        std: sample_std(values),
        min: values.min(),
        q25: values.quantile(0.25, QuantileMethod::Linear)?,
        median: values.median(),
        q75: values.quantile(0.75, QuantileMethod::Linear)?,
        max: values.max(),
    })
}
