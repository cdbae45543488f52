//! Weather Insights Library
//!
//! Cleans a table of weather observations and summarises it: global
//! descriptive statistics, a daily resample, per-season aggregates, optional
//! charts and a plain-text report.
//!
//! # Overview
//!
//! A run goes through fixed stages:
//!
//! - **Loading**: [`DatasetLoader`] reads a header-first CSV with polars
//! - **Preprocessing**: [`Preprocessor`] parses dates, drops unparseable rows,
//!   sorts chronologically and fills numeric gaps (forward fill, then mean)
//! - **Statistics**: [`StatsEngine`] computes count/mean/std/quartiles per
//!   column and mean/min/max/std per calendar day
//! - **Charts**: a [`ChartRenderer`] (SVG by default) draws temperature,
//!   rainfall and humidity charts
//! - **Seasons**: [`SeasonalAggregator`] groups by a [`SeasonMap`] and computes
//!   mean/median/std per season
//! - **Export**: [`Exporter`] writes the CSV tables and `summary_report.txt`
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use weather_insights::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .input_path("weather.csv")
//!     .output_dir("outputs")
//!     .generate_plots(true)
//!     .build()?;
//!
//! let outcome = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("Wrote {} files", outcome.files.len());
//! ```
//!
//! # Using the stages directly
//!
//! ```rust,ignore
//! use weather_insights::{DatasetLoader, Preprocessor, SeasonalAggregator, StatsEngine};
//!
//! let raw = DatasetLoader.load("weather.csv".as_ref())?;
//! let clean = Preprocessor::new("date").process(&raw)?;
//! let daily = StatsEngine.resample_daily(&clean)?;
//! let seasons = SeasonalAggregator::default().aggregate(&clean)?;
//! ```

pub mod charts;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod preprocess;
pub mod reporting;
pub mod seasons;
pub mod stats;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use charts::{Chart, ChartRenderer, Panel, Plot, SvgRenderer};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{PipelineError, Result as PipelineResult, ResultExt};
pub use loader::DatasetLoader;
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineOutcome, PipelineStage,
    ProgressReporter, ProgressUpdate,
};
pub use preprocess::Preprocessor;
pub use reporting::Exporter;
pub use seasons::{Season, SeasonMap, SeasonalAggregate, SeasonalAggregator};
pub use stats::StatsEngine;
pub use types::{
    CleanDataset, CleaningReport, ColumnFill, ColumnSummary, DailyResample, Dataset,
    GroupedStatistics, RunSummary, StatKey, Statistic, SummaryStatistics,
};
