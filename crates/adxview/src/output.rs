//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Tables are built
//! dynamically from the metric column descriptors, structured formats
//! serialize the wire rows via serde, plain emits tab-separated values.

use std::io::{self, IsTerminal, Write};

use tabled::builder::Builder;
use tabled::settings::Style;

use adxview_core::{MetricColumn, ReportRow};

use crate::cli::{ColorMode, OutputFormat};

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render report rows in the chosen format.
///
/// - `table`: column labels as header, one row per report row
/// - `json` / `json-compact` / `yaml`: serializes the wire rows via serde
/// - `plain`: tab-separated column values, one row per line
pub fn render_rows<R>(format: &OutputFormat, rows: &[R], columns: &[MetricColumn]) -> String
where
    R: ReportRow + serde::Serialize,
{
    match format {
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(columns.iter().map(|c| c.label.to_owned()));
            for row in rows {
                builder.push_record(columns.iter().map(|c| cell(row, c)));
            }
            builder.build().with(Style::rounded()).to_string()
        }
        OutputFormat::Json => render_json(rows, false),
        OutputFormat::JsonCompact => render_json(rows, true),
        OutputFormat::Yaml => render_yaml(rows),
        OutputFormat::Plain => rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| cell(row, c))
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn cell<R: ReportRow>(row: &R, column: &MetricColumn) -> String {
    row.field(column.key)
        .map_or_else(String::new, |v| v.to_string())
}

/// Render a key-value summary in the chosen format.
///
/// Keys are resolved to column labels for table output; structured formats
/// keep the wire field keys.
pub fn render_summary(
    format: &OutputFormat,
    summary: &indexmap::IndexMap<&'static str, f64>,
    columns: &[MetricColumn],
) -> String {
    let label_of = |key: &'static str| -> &'static str {
        columns
            .iter()
            .find(|c| c.key == key)
            .map_or(key, |c| c.label)
    };
    match format {
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["Metric".to_owned(), "Value".to_owned()]);
            for (key, value) in summary {
                builder.push_record([label_of(key).to_owned(), format_metric(*value)]);
            }
            builder.build().with(Style::rounded()).to_string()
        }
        OutputFormat::Json => render_json(summary, false),
        OutputFormat::JsonCompact => render_json(summary, true),
        OutputFormat::Yaml => render_yaml(summary),
        OutputFormat::Plain => summary
            .iter()
            .map(|(key, value)| format!("{key}\t{}", format_metric(*value)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted
/// string, since single-item detail views have no uniform column set.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Whole counters print bare, rates keep two decimals.
pub fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let result = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    result.expect("serialization should not fail")
}

pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}
