//! Configuration types for the weather pipeline.
//!
//! This module provides the run configuration using the builder pattern
//! for flexible and ergonomic pipeline setup.

use crate::seasons::SeasonMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one pipeline run.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use weather_insights::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .input_path("weather.csv")
///     .output_dir("outputs")
///     .generate_plots(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Source table (delimited text with a header row).
    pub input_path: PathBuf,

    /// Directory receiving every output file.
    /// Default: "outputs"
    pub output_dir: PathBuf,

    /// Whether to render the chart artifacts.
    /// Default: false
    pub generate_plots: bool,

    /// Column holding the observation date.
    /// Default: "date"
    pub date_column: String,

    /// Column plotted as temperature.
    /// Default: "temperature"
    pub temperature_column: String,

    /// Column plotted as humidity.
    /// Default: "humidity"
    pub humidity_column: String,

    /// Column plotted as rainfall.
    /// Default: "rainfall"
    pub rainfall_column: String,

    /// Month → season table used by the seasonal aggregation.
    #[serde(default)]
    pub season_map: SeasonMap,

    /// Whether to write `run_summary.json` next to the other outputs.
    /// Default: false
    #[serde(default)]
    pub emit_run_summary: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            output_dir: PathBuf::from("outputs"),
            generate_plots: false,
            date_column: "date".to_string(),
            temperature_column: "temperature".to_string(),
            humidity_column: "humidity".to_string(),
            rainfall_column: "rainfall".to_string(),
            season_map: SeasonMap::default(),
            emit_run_summary: false,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// The three plotted columns with their display roles.
    pub fn plot_columns(&self) -> [(&'static str, &str); 3] {
        [
            ("Temperature", self.temperature_column.as_str()),
            ("Humidity", self.humidity_column.as_str()),
            ("Rainfall", self.rainfall_column.as_str()),
        ]
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.input_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::MissingInput);
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyValue("output_dir".to_string()));
        }

        let named = [
            ("date_column", &self.date_column),
            ("temperature_column", &self.temperature_column),
            ("humidity_column", &self.humidity_column),
            ("rainfall_column", &self.rainfall_column),
        ];
        for (field, value) in named {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyValue(field.to_string()));
            }
        }

        for (role, column) in self.plot_columns() {
            if column == self.date_column {
                return Err(ConfigValidationError::DateColumnReused {
                    role: role.to_string(),
                    column: column.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("An input path is required")]
    MissingInput,

    #[error("'{0}' must not be empty")]
    EmptyValue(String),

    #[error("{role} column '{column}' is also the date column")]
    DateColumnReused { role: String, column: String },
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    input_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    generate_plots: Option<bool>,
    date_column: Option<String>,
    temperature_column: Option<String>,
    humidity_column: Option<String>,
    rainfall_column: Option<String>,
    season_map: Option<SeasonMap>,
    emit_run_summary: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the source table path.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the output directory. Created on demand, parents included.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Enable or disable chart rendering.
    pub fn generate_plots(mut self, generate: bool) -> Self {
        self.generate_plots = Some(generate);
        self
    }

    pub fn date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = Some(column.into());
        self
    }

    pub fn temperature_column(mut self, column: impl Into<String>) -> Self {
        self.temperature_column = Some(column.into());
        self
    }

    pub fn humidity_column(mut self, column: impl Into<String>) -> Self {
        self.humidity_column = Some(column.into());
        self
    }

    pub fn rainfall_column(mut self, column: impl Into<String>) -> Self {
        self.rainfall_column = Some(column.into());
        self
    }

    /// Replace the default month → season table.
    pub fn season_map(mut self, map: SeasonMap) -> Self {
        self.season_map = Some(map);
        self
    }

    /// Enable or disable writing `run_summary.json`.
    pub fn emit_run_summary(mut self, emit: bool) -> Self {
        self.emit_run_summary = Some(emit);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            generate_plots: self.generate_plots.unwrap_or(defaults.generate_plots),
            date_column: self.date_column.unwrap_or(defaults.date_column),
            temperature_column: self
                .temperature_column
                .unwrap_or(defaults.temperature_column),
            humidity_column: self.humidity_column.unwrap_or(defaults.humidity_column),
            rainfall_column: self.rainfall_column.unwrap_or(defaults.rainfall_column),
            season_map: self.season_map.unwrap_or(defaults.season_map),
            emit_run_summary: self.emit_run_summary.unwrap_or(defaults.emit_run_summary),
        };

        config.validate()?;
        Ok(config)
    }
}
