//! Standalone SVG output for [`Chart`]s.

use super::{Chart, ChartRenderer, Panel, Plot};
use crate::error::{PipelineError, Result};
use std::path::Path;

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 50.0;
const Y_TICKS: usize = 5;

const STROKE: &str = "#1f77b4";
const AXIS: &str = "#333333";
const GRID: &str = "#dddddd";

/// Writes charts as SVG documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRenderer;

impl ChartRenderer for SvgRenderer {
    fn extension(&self) -> &'static str {
        "svg"
    }

    fn render(&self, chart: &Chart, path: &Path) -> Result<()> {
        std::fs::write(path, self.document(chart)).map_err(|e| PipelineError::output(path, e))
    }
}

impl SvgRenderer {
    /// Build the full SVG document for `chart`.
    pub fn document(&self, chart: &Chart) -> String {
        let width = f64::from(chart.width);
        let height = f64::from(chart.height);
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\" font-size=\"12\">\n",
            w = chart.width,
            h = chart.height
        );
        svg.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"white\"/>\n",
            chart.width, chart.height
        ));

        let panel_height = height / chart.panels.len().max(1) as f64;
        for (i, panel) in chart.panels.iter().enumerate() {
            let frame = Frame {
                left: MARGIN_LEFT,
                right: width - MARGIN_RIGHT,
                top: i as f64 * panel_height + MARGIN_TOP,
                bottom: (i + 1) as f64 * panel_height - MARGIN_BOTTOM,
            };
            draw_panel(&mut svg, panel, &frame);
        }

        svg.push_str("</svg>\n");
        svg
    }
}

/// Plot area of one panel in pixel coordinates.
struct Frame {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Frame {
    fn width(&self) -> f64 {
        self.right - self.left
    }

    fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Linear map from a data range to a pixel range.
#[derive(Clone, Copy)]
struct Scale {
    lo: f64,
    hi: f64,
    from: f64,
    to: f64,
}

impl Scale {
    fn new((lo, hi): (f64, f64), from: f64, to: f64) -> Self {
        Self { lo, hi, from, to }
    }

    fn map(&self, v: f64) -> f64 {
        self.from + (v - self.lo) / (self.hi - self.lo) * (self.to - self.from)
    }
}

fn draw_panel(svg: &mut String, panel: &Panel, frame: &Frame) {
    let center = frame.left + frame.width() / 2.0;
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"14\">{}</text>\n",
        center,
        frame.top - 15.0,
        escape(&panel.title)
    ));
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
        center,
        frame.bottom + 40.0,
        escape(&panel.x_label)
    ));
    svg.push_str(&format!(
        "<text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"middle\" transform=\"rotate(-90 {x:.1} {y:.1})\">{label}</text>\n",
        x = frame.left - 50.0,
        y = frame.top + frame.height() / 2.0,
        label = escape(&panel.y_label)
    ));

    if panel.plot.is_empty() {
        draw_axes(svg, frame);
        return;
    }

    match &panel.plot {
        Plot::Line { points, x_ticks } => {
            let x = Scale::new(
                padded(bounds(points.iter().map(|p| p.0))),
                frame.left,
                frame.right,
            );
            let y = y_scale(points.iter().map(|p| p.1), false, frame);
            draw_y_ticks(svg, &y, frame);
            for (pos, label) in x_ticks {
                draw_x_tick(svg, x.map(*pos), label, frame);
            }
            draw_axes(svg, frame);

            let path: Vec<String> = points
                .iter()
                .map(|(px, py)| format!("{:.2},{:.2}", x.map(*px), y.map(*py)))
                .collect();
            svg.push_str(&format!(
                "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" points=\"{}\"/>\n",
                STROKE,
                path.join(" ")
            ));
        }
        Plot::Bar { bars } => {
            let y = y_scale(bars.iter().map(|b| b.1), true, frame);
            draw_y_ticks(svg, &y, frame);
            let slot = frame.width() / bars.len() as f64;
            let baseline = y.map(0.0);
            for (i, (label, value)) in bars.iter().enumerate() {
                let center = frame.left + slot * (i as f64 + 0.5);
                let top = y.map(*value).min(baseline);
                let bar_height = (y.map(*value) - baseline).abs();
                svg.push_str(&format!(
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>\n",
                    center - slot * 0.4,
                    top,
                    slot * 0.8,
                    bar_height,
                    STROKE
                ));
                draw_x_tick(svg, center, label, frame);
            }
            draw_axes(svg, frame);
        }
        Plot::Scatter { points } => {
            let x = Scale::new(
                padded(bounds(points.iter().map(|p| p.0))),
                frame.left,
                frame.right,
            );
            let y = y_scale(points.iter().map(|p| p.1), false, frame);
            draw_y_ticks(svg, &y, frame);
            for value in tick_values(x.lo, x.hi) {
                draw_x_tick(svg, x.map(value), &format_tick(value), frame);
            }
            draw_axes(svg, frame);
            for (px, py) in points {
                svg.push_str(&format!(
                    "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"3\" fill=\"{}\" fill-opacity=\"0.6\"/>\n",
                    x.map(*px),
                    y.map(*py),
                    STROKE
                ));
            }
        }
    }
}

fn draw_axes(svg: &mut String, frame: &Frame) {
    svg.push_str(&format!(
        "<polyline fill=\"none\" stroke=\"{}\" points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\"/>\n",
        AXIS, frame.left, frame.top, frame.left, frame.bottom, frame.right, frame.bottom
    ));
}

fn draw_y_ticks(svg: &mut String, y: &Scale, frame: &Frame) {
    for value in tick_values(y.lo, y.hi) {
        let py = y.map(value);
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.2}\" x2=\"{:.1}\" y2=\"{:.2}\" stroke=\"{}\"/>\n",
            frame.left, py, frame.right, py, GRID
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.2}\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            frame.left - 6.0,
            py,
            format_tick(value)
        ));
    }
}

fn draw_x_tick(svg: &mut String, px: f64, label: &str, frame: &Frame) {
    svg.push_str(&format!(
        "<line x1=\"{:.2}\" y1=\"{:.1}\" x2=\"{:.2}\" y2=\"{:.1}\" stroke=\"{}\"/>\n",
        px,
        frame.bottom,
        px,
        frame.bottom + 5.0,
        AXIS
    ));
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
        px,
        frame.bottom + 18.0,
        escape(label)
    ));
}

fn y_scale(values: impl Iterator<Item = f64>, from_zero: bool, frame: &Frame) -> Scale {
    let (lo, hi) = bounds(values);
    let range = if from_zero {
        (lo.min(0.0), hi.max(0.0))
    } else {
        (lo, hi)
    };
    Scale::new(padded(range), frame.bottom, frame.top)
}

/// Min and max of `values`; `(0, 1)` when empty.
fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })
        .unwrap_or((0.0, 1.0))
}

/// Widen a degenerate range so it can be mapped.
fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        (lo - 1.0, hi + 1.0)
    }
}

fn tick_values(lo: f64, hi: f64) -> Vec<f64> {
    let step = (hi - lo) / (Y_TICKS - 1) as f64;
    (0..Y_TICKS).map(|i| lo + step * i as f64).collect()
}

fn format_tick(value: f64) -> String {
    if value.abs() >= 100.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
