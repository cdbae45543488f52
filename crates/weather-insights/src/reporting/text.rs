//! Fixed-width text tables for `summary_report.txt`.

use crate::seasons::SeasonalAggregate;
use crate::types::{ColumnSummary, SummaryStatistics};

const GAP: &str = "  ";

/// Render the summary report.
///
/// Values use four decimals; undefined values print as `NaN`. The output
/// depends only on its inputs.
pub fn render_report(summary: &SummaryStatistics, seasonal: &SeasonalAggregate) -> String {
    format!(
        "Summary insights\n================\n\nGlobal statistics:\n{}\n\nSeasonal aggregation:\n{}\n",
        global_table(summary),
        seasonal_table(seasonal)
    )
}

fn global_table(summary: &SummaryStatistics) -> String {
    let header: Vec<String> = summary.columns.iter().map(|c| c.column.clone()).collect();
    let rows: Vec<(String, Vec<String>)> = ColumnSummary::ROWS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let cells = summary
                .columns
                .iter()
                .map(|c| format_value(c.values()[i]))
                .collect();
            (label.to_string(), cells)
        })
        .collect();

    layout(&[header], &rows)
}

fn seasonal_table(seasonal: &SeasonalAggregate) -> String {
    // Column name only above the first of its statistics
    let mut columns_line = Vec::with_capacity(seasonal.keys().len());
    let mut previous: Option<&str> = None;
    for key in seasonal.keys() {
        if previous == Some(key.column.as_str()) {
            columns_line.push(String::new());
        } else {
            columns_line.push(key.column.clone());
        }
        previous = Some(&key.column);
    }
    let statistics_line: Vec<String> = seasonal
        .keys()
        .iter()
        .map(|k| k.statistic.to_string())
        .collect();

    let mut rows = vec![("season".to_string(), vec![String::new(); seasonal.keys().len()])];
    rows.extend(seasonal.rows().map(|(season, cells)| {
        (
            season.to_string(),
            cells.iter().map(|v| format_value(*v)).collect(),
        )
    }));

    layout(&[columns_line, statistics_line], &rows)
}

/// Lay out header lines and labelled rows with right-aligned columns.
fn layout(headers: &[Vec<String>], rows: &[(String, Vec<String>)]) -> String {
    let cells = headers.first().map_or(0, Vec::len);
    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    let mut widths = vec![0usize; cells];
    for line in headers.iter().chain(rows.iter().map(|(_, values)| values)) {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.len());
        }
    }

    let mut lines = Vec::with_capacity(headers.len() + rows.len());
    for header in headers {
        lines.push(join_line("", label_width, header, &widths));
    }
    for (label, values) in rows {
        lines.push(join_line(label, label_width, values, &widths));
    }
    lines.join("\n")
}

fn join_line(label: &str, label_width: usize, cells: &[String], widths: &[usize]) -> String {
    let mut line = format!("{:<width$}", label, width = label_width);
    for (cell, width) in cells.iter().zip(widths) {
        line.push_str(GAP);
        line.push_str(&format!("{:>width$}", cell, width = width));
    }
    line.trim_end().to_string()
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.4}", v),
        _ => "NaN".to_string(),
    }
}
