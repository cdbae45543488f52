//! Chart preparation and rendering.
//!
//! Charts are described as plain data ([`Chart`], [`Panel`], [`Plot`]) and
//! handed to a [`ChartRenderer`], which owns the output format. The default
//! renderer writes standalone SVG documents.

mod svg;

pub use svg::SvgRenderer;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::types::CleanDataset;
use chrono::Datelike;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Number of labelled ticks on a time axis.
const TIME_TICKS: usize = 5;

// ============================================================================
// Chart model
// ============================================================================

/// What one panel draws.
#[derive(Debug, Clone, PartialEq)]
pub enum Plot {
    /// Points joined in order, with labelled ticks on the x axis.
    Line {
        points: Vec<(f64, f64)>,
        x_ticks: Vec<(f64, String)>,
    },
    /// One bar per label, in order.
    Bar { bars: Vec<(String, f64)> },
    /// Unjoined points.
    Scatter { points: Vec<(f64, f64)> },
}

impl Plot {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Line { points, .. } | Self::Scatter { points } => points.is_empty(),
            Self::Bar { bars } => bars.is_empty(),
        }
    }
}

/// A titled set of axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub plot: Plot,
}

/// A chart artifact: one or more panels stacked vertically.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    /// File stem of the artifact, e.g. `daily_temperature`.
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub panels: Vec<Panel>,
}

/// Turns a [`Chart`] into a file.
///
/// Implementations must be stateless with respect to the run so that the
/// same chart always produces the same bytes.
pub trait ChartRenderer: Send + Sync {
    /// Extension of the files this renderer writes, without the dot.
    fn extension(&self) -> &'static str;

    /// Write `chart` to `path`, replacing any existing file.
    fn render(&self, chart: &Chart, path: &Path) -> Result<()>;
}

static_assertions::assert_impl_all!(SvgRenderer: ChartRenderer, Send, Sync);

// ============================================================================
// Validation
// ============================================================================

/// Check that every plotted column exists and is numeric.
///
/// Runs before anything is written so a bad column name leaves no output.
pub fn validate_plot_columns(data: &CleanDataset, config: &PipelineConfig) -> Result<()> {
    let available = data.column_names();
    for (role, column) in config.plot_columns() {
        if !available.iter().any(|c| c == column) {
            return Err(PipelineError::column_not_found(column, role, &available));
        }
        if !data.numeric_columns().iter().any(|c| c == column) {
            return Err(PipelineError::Configuration(format!(
                "{} column '{}' is not numeric",
                role, column
            )));
        }
    }
    Ok(())
}

// ============================================================================
// Preparation
// ============================================================================

/// Build the four standard charts, in render order.
pub fn prepare_charts(data: &CleanDataset, config: &PipelineConfig) -> Result<Vec<Chart>> {
    let temperature = config.temperature_column.as_str();
    let humidity = config.humidity_column.as_str();
    let rainfall = config.rainfall_column.as_str();

    Ok(vec![
        Chart {
            name: "daily_temperature".to_string(),
            width: 1000,
            height: 400,
            panels: vec![temperature_panel(data, temperature, "Daily Temperature Trend", "Date")?],
        },
        Chart {
            name: "monthly_rainfall".to_string(),
            width: 800,
            height: 400,
            panels: vec![rainfall_panel(
                data,
                rainfall,
                "Monthly Rainfall Totals",
                "Total Rainfall",
                true,
            )?],
        },
        Chart {
            name: "humidity_vs_temp".to_string(),
            width: 600,
            height: 500,
            panels: vec![scatter_panel(data, temperature, humidity)?],
        },
        Chart {
            name: "combined_plots".to_string(),
            width: 1000,
            height: 800,
            panels: vec![
                temperature_panel(data, temperature, "Daily Temperature", "")?,
                rainfall_panel(data, rainfall, "Monthly Rainfall", "Rainfall", false)?,
            ],
        },
    ])
}

/// Render every chart into `output_dir`, returning the written paths.
pub fn render_charts(
    renderer: &dyn ChartRenderer,
    charts: &[Chart],
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(charts.len());
    for chart in charts {
        let path = output_dir.join(format!("{}.{}", chart.name, renderer.extension()));
        renderer.render(chart, &path)?;
        debug!("Rendered chart: {}", path.display());
        written.push(path);
    }
    info!("Rendered {} charts", written.len());
    Ok(written)
}

/// Sum of `rainfall` per calendar month, for months present in the data.
pub fn monthly_totals(data: &CleanDataset, rainfall: &str) -> Result<BTreeMap<u32, f64>> {
    let values = data.numeric_values(rainfall)?;
    let mut totals: BTreeMap<u32, f64> = BTreeMap::new();
    for (ts, value) in data.timestamps().iter().zip(values) {
        let entry = totals.entry(ts.month()).or_insert(0.0);
        if let Some(v) = value {
            *entry += v;
        }
    }
    Ok(totals)
}

fn temperature_panel(
    data: &CleanDataset,
    temperature: &str,
    title: &str,
    x_label: &str,
) -> Result<Panel> {
    let values = data.numeric_values(temperature)?;
    let positions: Vec<f64> = data
        .timestamps()
        .iter()
        .map(|ts| ts.and_utc().timestamp() as f64)
        .collect();

    let points: Vec<(f64, f64)> = positions
        .iter()
        .zip(&values)
        .filter_map(|(x, y)| y.map(|y| (*x, y)))
        .collect();

    let x_ticks = tick_indices(data.timestamps().len(), TIME_TICKS)
        .into_iter()
        .map(|i| (positions[i], data.timestamps()[i].format("%Y-%m-%d").to_string()))
        .collect();

    Ok(Panel {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: capitalize(temperature),
        plot: Plot::Line { points, x_ticks },
    })
}

/// With `all_months`, every month 1..=12 gets a slot; months without records
/// show a zero bar. Otherwise only months present in the data appear.
fn rainfall_panel(
    data: &CleanDataset,
    rainfall: &str,
    title: &str,
    y_label: &str,
    all_months: bool,
) -> Result<Panel> {
    let totals = monthly_totals(data, rainfall)?;
    let bars = if all_months && !totals.is_empty() {
        (1u32..=12)
            .map(|month| (month.to_string(), totals.get(&month).copied().unwrap_or(0.0)))
            .collect()
    } else {
        totals
            .into_iter()
            .map(|(month, total)| (month.to_string(), total))
            .collect()
    };

    Ok(Panel {
        title: title.to_string(),
        x_label: "Month".to_string(),
        y_label: y_label.to_string(),
        plot: Plot::Bar { bars },
    })
}

fn scatter_panel(data: &CleanDataset, temperature: &str, humidity: &str) -> Result<Panel> {
    let points = data
        .numeric_values(temperature)?
        .into_iter()
        .zip(data.numeric_values(humidity)?)
        .filter_map(|(t, h)| Some((t?, h?)))
        .collect();

    Ok(Panel {
        title: "Humidity vs Temperature".to_string(),
        x_label: "Temperature".to_string(),
        y_label: "Humidity".to_string(),
        plot: Plot::Scatter { points },
    })
}

/// Up to `count` evenly spaced indices into `len` items, first and last included.
fn tick_indices(len: usize, count: usize) -> Vec<usize> {
    if len == 0 || count == 0 {
        return Vec::new();
    }
    if len <= count {
        return (0..len).collect();
    }
    let mut indices: Vec<usize> = (0..count)
        .map(|k| k * (len - 1) / (count - 1).max(1))
        .collect();
    indices.dedup();
    indices
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
