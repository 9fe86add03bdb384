//! Preset listing command handler.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::{Table, Tabled, settings::Style};

use adxview_core::RangePreset;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Serialize, Tabled)]
struct PresetRow {
    #[tabled(rename = "Preset")]
    name: String,
    #[tabled(rename = "Label")]
    label: &'static str,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
}

/// List every date range preset resolved against today.
pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let today = chrono::Local::now().date_naive();
    let rows: Vec<PresetRow> = RangePreset::iter()
        .map(|preset| {
            let range = preset.resolve(today);
            PresetRow {
                name: preset.to_string(),
                label: range.label,
                start: range.start.to_string(),
                end: range.end.to_string(),
            }
        })
        .collect();

    let rendered = match global.output {
        OutputFormat::Table => Table::new(&rows).with(Style::rounded()).to_string(),
        OutputFormat::Json => output::render_json(&rows, false),
        OutputFormat::JsonCompact => output::render_json(&rows, true),
        OutputFormat::Yaml => output::render_yaml(&rows),
        OutputFormat::Plain => rows
            .iter()
            .map(|r| format!("{}\t{}\t{}", r.name, r.start, r.end))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    output::print_output(&rendered, global.quiet);
    Ok(())
}
