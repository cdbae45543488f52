//! Error types for the weather analysis pipeline.
//!
//! The taxonomy follows the three fatal failure classes of a run: the input
//! could not be read, the configuration does not match the data, or an output
//! could not be written. Rows with unparseable dates are not errors; they are
//! dropped by the preprocessor and counted in its report.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input file is missing, unreadable, or not a delimited table.
    #[error("Cannot read input '{}': {reason}", path.display())]
    Input { path: PathBuf, reason: String },

    /// A configured column is absent from the dataset schema.
    #[error("{role} column '{column}' not found in dataset (available: {available})")]
    ColumnNotFound {
        column: String,
        role: String,
        available: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The output directory or an output file could not be written.
    #[error("Cannot write '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Build an input error for `path`.
    pub fn input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Input {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build an output error for `path`.
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }

    /// Build a missing-column error listing the columns that do exist.
    pub fn column_not_found(
        column: impl Into<String>,
        role: impl Into<String>,
        available: &[String],
    ) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
            role: role.into(),
            available: available.join(", "),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, used by `--json` output and tests.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Input { .. } => "INPUT_ERROR",
            Self::ColumnNotFound { .. } | Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Output { .. } => "OUTPUT_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error came from a configuration/schema mismatch.
    pub fn is_configuration(&self) -> bool {
        self.error_code() == "CONFIGURATION_ERROR"
    }
}

impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}
