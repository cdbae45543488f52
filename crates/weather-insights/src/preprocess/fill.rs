//! Forward-fill-then-mean imputation for numeric columns.

use polars::prelude::*;

/// Result of filling one column.
#[derive(Debug, Clone)]
pub struct FillOutcome {
    pub series: Series,
    pub forward_filled: usize,
    pub mean_filled: usize,
    pub fill_mean: Option<f64>,
}

/// Fill gaps in row order.
///
/// Each missing value takes the most recent earlier present value. Values
/// still missing afterwards (a leading gap) take the mean of the column as it
/// stands after the forward pass. A column with no present values is returned
/// unchanged. The result is always `Float64`.
pub fn forward_fill_then_mean(series: &Series) -> PolarsResult<FillOutcome> {
    let series = series.cast(&DataType::Float64)?;
    let missing = series.null_count();

    let forward = series.fill_null(FillNullStrategy::Forward(None))?;
    let leading_gap = forward.null_count();
    let forward_filled = missing - leading_gap;

    if leading_gap == 0 {
        return Ok(FillOutcome {
            series: forward,
            forward_filled,
            mean_filled: 0,
            fill_mean: None,
        });
    }

    let Some(fill_mean) = forward.mean() else {
        return Ok(FillOutcome {
            series: forward,
            forward_filled,
            mean_filled: 0,
            fill_mean: None,
        });
    };

    let filled = forward
        .f64()?
        .fill_null_with_values(fill_mean)?
        .into_series();

    Ok(FillOutcome {
        series: filled,
        forward_filled,
        mean_filled: leading_gap,
        fill_mean: Some(fill_mean),
    })
}
