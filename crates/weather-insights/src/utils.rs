//! Shared utilities for the weather pipeline.
//!
//! This module contains the dtype helpers, text-to-number parsing, and the
//! sample standard deviation used by the stats and seasonal stages.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Extract a Series as `f64` values, keeping nulls (and NaN) as `None`.
pub fn series_to_f64(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|val| !val.is_nan()))
        .collect())
}

/// Extract a Series as text, keeping nulls as `None`.
pub fn series_to_strings(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Cell values a CSV reader conventionally treats as missing.
pub const MISSING_MARKERS: [&str; 12] = [
    "na", "n/a", "nan", "-nan", "null", "none", "missing", "#n/a", "nil", "-", "?", "<na>",
];

/// Check if a string is an empty cell or a missing value marker.
///
/// # Example
///
/// ```rust,ignore
/// use weather_insights::utils::is_missing_marker;
///
/// assert!(is_missing_marker("NA"));
/// assert!(is_missing_marker("  "));
/// assert!(!is_missing_marker("12.5"));
/// ```
pub fn is_missing_marker(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.is_empty() || MISSING_MARKERS.iter().any(|&marker| lower == marker)
}

/// Try to parse a string as a finite numeric value.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Check whether a text column holds numbers written as text.
///
/// Every non-null value must either parse as a number or be a missing marker.
/// A column holding nothing but blanks and markers qualifies as an empty
/// numeric column.
pub fn is_numeric_text(values: &[Option<String>]) -> bool {
    values
        .iter()
        .flatten()
        .all(|value| is_missing_marker(value) || parse_numeric_string(value).is_some())
}

// =============================================================================
// Descriptive Statistics
// =============================================================================

/// Sample standard deviation (ddof = 1); undefined below two present values.
pub fn sample_std(values: &Float64Chunked) -> Option<f64> {
    if values.len() - values.null_count() < 2 {
        return None;
    }
    values.std(1)
}

/// Drop missing entries, keeping the present values in order.
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

// =============================================================================
// Tests
// =============================================================================
