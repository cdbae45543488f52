//! The pipeline orchestrator.
//!
//! [`Pipeline`] wires a [`PipelineConfig`] into every stage and runs them in
//! a fixed order. The first failure aborts the run. All validation (input,
//! date column, plotted columns) happens before the output directory is
//! created, so a configuration error leaves nothing on disk.

use crate::charts::{ChartRenderer, SvgRenderer, prepare_charts, render_charts, validate_plot_columns};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::loader::DatasetLoader;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::preprocess::Preprocessor;
use crate::reporting::{Exporter, RUN_SUMMARY_FILE};
use crate::seasons::{SeasonalAggregate, SeasonalAggregator};
use crate::stats::StatsEngine;
use crate::types::{CleaningReport, DailyResample, RunSummary, SummaryStatistics};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub summary: RunSummary,
    pub statistics: SummaryStatistics,
    pub daily: DailyResample,
    pub seasonal: SeasonalAggregate,
    pub cleaning: CleaningReport,
    /// Every file written, in write order.
    pub files: Vec<PathBuf>,
}

/// The weather analysis pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use weather_insights::{Pipeline, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .input_path("weather.csv")
///     .generate_plots(true)
///     .build()?;
///
/// let outcome = Pipeline::new(config).run()?;
/// println!("{} rows kept", outcome.summary.cleaned_shape.0);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    renderer: Arc<dyn ChartRenderer>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Pipeline with the default SVG renderer and no progress reporter.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            renderer: Arc::new(SvgRenderer),
            progress_reporter: None,
        }
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Replace the chart renderer.
    pub fn with_renderer(mut self, renderer: impl ChartRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage.
    pub fn run(&self) -> Result<PipelineOutcome> {
        match self.run_internal() {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                debug!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn enter(&self, stage: PipelineStage, message: &str) {
        info!("{}: {}", stage.display_name(), message);
        self.report_progress(ProgressUpdate::new(stage, 0.0, message));
    }

    fn run_internal(&self) -> Result<PipelineOutcome> {
        let config = &self.config;

        self.enter(PipelineStage::Loading, "Reading input table");
        let dataset = DatasetLoader.load(&config.input_path)?;

        self.enter(PipelineStage::Preprocessing, "Cleaning dataset");
        let clean = Preprocessor::new(&config.date_column).process(&dataset)?;
        if config.generate_plots {
            validate_plot_columns(&clean, config)?;
        }

        self.enter(PipelineStage::Statistics, "Computing summary and daily resample");
        let statistics = StatsEngine.summarize(&clean)?;
        let daily = StatsEngine.resample_daily(&clean)?;

        let exporter = Exporter::new(&config.output_dir);
        exporter.ensure_output_dir()?;
        let mut files = Vec::new();

        if config.generate_plots {
            self.enter(PipelineStage::Charts, "Rendering charts");
            let charts = prepare_charts(&clean, config)?;
            files.extend(render_charts(
                self.renderer.as_ref(),
                &charts,
                exporter.output_dir(),
            )?);
        } else {
            debug!("Chart rendering disabled");
        }

        self.enter(PipelineStage::SeasonalAggregation, "Grouping by season");
        let seasonal = SeasonalAggregator::new(config.season_map.clone()).aggregate(&clean)?;

        self.enter(PipelineStage::Export, "Writing outputs");
        files.push(exporter.write_summary(&statistics)?);
        files.push(exporter.write_daily(&daily)?);
        files.push(exporter.write_seasonal(&seasonal)?);
        files.push(exporter.write_cleaned(&clean)?);
        files.push(exporter.write_report(&statistics, &seasonal)?);

        let mut files_written: Vec<String> = files.iter().map(|p| file_name(p)).collect();
        if config.emit_run_summary {
            files_written.push(RUN_SUMMARY_FILE.to_string());
        }

        let report = clean.report().clone();
        let summary = RunSummary {
            input_file: config.input_path.display().to_string(),
            raw_shape: (dataset.height(), dataset.width()),
            cleaned_shape: (clean.height(), clean.width()),
            rows_dropped: report.rows_dropped,
            numeric_columns: clean.numeric_columns().to_vec(),
            coerced_columns: report.coerced_columns.clone(),
            fills: report.fills.clone(),
            day_groups: daily.len(),
            seasons: seasonal.groups().iter().map(|s| s.to_string()).collect(),
            plots_generated: config.generate_plots,
            files_written,
        };

        if config.emit_run_summary {
            files.push(exporter.write_run_summary(&summary)?);
        }

        info!(
            "Wrote {} files to {}",
            files.len(),
            exporter.output_dir().display()
        );

        Ok(PipelineOutcome {
            summary,
            statistics,
            daily,
            seasonal,
            cleaning: report,
            files,
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    renderer: Option<Arc<dyn ChartRenderer>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the run configuration. Required.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a custom chart renderer instead of [`SvgRenderer`].
    pub fn renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<Pipeline> {
        let config = self
            .config
            .ok_or_else(|| PipelineError::Configuration("no configuration provided".to_string()))?;
        config
            .validate()
            .map_err(|e| PipelineError::Configuration(e.to_string()))?;

        Ok(Pipeline {
            config,
            renderer: self.renderer.unwrap_or_else(|| Arc::new(SvgRenderer)),
            progress_reporter: self.progress_reporter,
        })
    }
}
