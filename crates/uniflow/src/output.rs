//! Output formatting: table, JSON, YAML, NDJSON.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use uniflow_core::OutputRecord;

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render serializable rows; `table` uses `to_row` for the tabled view.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    if format == OutputFormat::Table {
        let rows: Vec<R> = data.iter().map(to_row).collect();
        return Ok(render_table(&rows));
    }
    render_structured(format, data)
}

/// Render a single serializable value. `table` falls back to pretty JSON.
pub fn render_single<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Table | OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact | OutputFormat::Ndjson => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
    })
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Item")]
    item: usize,
    #[tabled(rename = "Record")]
    record: String,
}

/// Render batch output: the record payloads, in order.
pub fn render_records(format: OutputFormat, records: &[OutputRecord]) -> Result<String, CliError> {
    if format == OutputFormat::Table {
        let rows: Vec<RecordRow> = records
            .iter()
            .map(|r| RecordRow {
                item: r.item_index,
                record: r.json.to_string(),
            })
            .collect();
        return Ok(render_table(&rows));
    }
    let payloads: Vec<&Value> = records.iter().map(|r| &r.json).collect();
    render_structured(format, &payloads)
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", output.trim_end_matches('\n'));
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Every non-table format; `table` falls back to pretty JSON.
fn render_structured<T: Serialize>(format: OutputFormat, data: &[T]) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Table | OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Ndjson => render_ndjson(data)?,
    })
}

fn render_ndjson<T: Serialize>(data: &[T]) -> Result<String, CliError> {
    let lines = data
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}
