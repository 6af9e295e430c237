//! Output writer: turns the final record sequence (or single record) into
//! the format the operator asked for. Commands decide *what* to print, this
//! module decides *how*.

use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};
use colored::*;
use is_terminal::IsTerminal;
use serde_json::Value;

#[derive(Args)]
pub struct OutputOpts {
    /// Output format
    #[arg(long = "output", default_value = "text")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Print progress and request details
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table (list) or key/value lines (single record)
    Text,
    /// Pretty-printed JSON
    Json,
    /// Compact JSON (no whitespace, for piping)
    JsonCompact,
    /// CSV
    Csv,
}

/// Honors --no-color and suppresses colors when stdout is not a terminal.
pub fn configure_colors(opts: &OutputOpts) {
    if opts.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
}

/// Prints a record sequence. `columns` drive the text table; JSON and CSV
/// emit every field of every record.
pub fn print_records(records: &[Value], columns: &[&str], opts: &OutputOpts) -> Result<()> {
    match opts.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(records).context("Failed to format JSON output")?
            );
        }
        OutputFormat::JsonCompact => {
            println!(
                "{}",
                serde_json::to_string(records).context("Failed to format JSON output")?
            );
        }
        OutputFormat::Csv => print!("{}", records_to_csv(records)?),
        OutputFormat::Text => {
            if records.is_empty() {
                if opts.verbose {
                    println!("No items found.");
                }
            } else {
                print!("{}", text_table(records, columns));
            }
        }
    }
    Ok(())
}

/// Prints a single record; the text format renders key/value lines.
pub fn print_record(record: &Value, opts: &OutputOpts) -> Result<()> {
    match opts.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(record).context("Failed to format JSON output")?
            );
        }
        OutputFormat::JsonCompact => {
            println!(
                "{}",
                serde_json::to_string(record).context("Failed to format JSON output")?
            );
        }
        OutputFormat::Csv => {
            let object = record
                .as_object()
                .ok_or_else(|| anyhow!("Cannot render a non-object record as CSV"))?;
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(["key", "value"])?;
            for (key, value) in object {
                writer.write_record([key.as_str(), cell_text(Some(value)).as_str()])?;
            }
            print!("{}", finish_csv(writer)?);
        }
        OutputFormat::Text => {
            let Some(object) = record.as_object() else {
                println!("{}", cell_text(Some(record)));
                return Ok(());
            };
            let width = object.keys().map(String::len).max().unwrap_or(0);
            for (key, value) in object {
                // pad before coloring; escape codes would skew the width
                let padded = format!("{:<width$}", key, width = width);
                println!("{}  {}", padded.bold(), cell_text(Some(value)));
            }
        }
    }
    Ok(())
}

fn records_to_csv(records: &[Value]) -> Result<String> {
    let Some(Value::Object(first)) = records.first() else {
        return Ok(String::new());
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;

    for record in records {
        if let Value::Object(object) = record {
            let row: Vec<String> = headers
                .iter()
                .map(|header| cell_text(object.get(header)))
                .collect();
            writer.write_record(&row)?;
        }
    }

    finish_csv(writer)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to finalize CSV output: {}", e))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

fn text_table(records: &[Value], columns: &[&str]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| cell_text(record.get(*column)))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|column| column.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut table = String::new();
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| format!("{:<width$}", column, width = width))
        .collect();
    table.push_str(&format!("{}\n", header.join("  ").bold()));

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        table.push_str(line.join("  ").trim_end());
        table.push('\n');
    }

    table
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| cell_text(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_pads_columns_and_flattens_arrays() {
        colored::control::set_override(false);
        let records = vec![
            json!({ "id": "1", "roles": ["owner"], "displayName": "Ann" }),
            json!({ "id": "2", "roles": [], "displayName": "Bartholomew" }),
        ];

        let table = text_table(&records, &["id", "displayName", "roles"]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "id  displayName  roles");
        assert_eq!(lines[1], "1   Ann          owner");
        assert_eq!(lines[2], "2   Bartholomew");
    }

    #[test]
    fn csv_uses_first_record_for_headers() {
        let records = vec![
            json!({ "id": "1", "mail": "a@contoso.com" }),
            json!({ "id": "2", "mail": null }),
        ];

        let csv = records_to_csv(&records).unwrap();
        assert_eq!(csv, "id,mail\n1,a@contoso.com\n2,\n");
    }

    #[test]
    fn csv_escapes_embedded_commas() {
        let records = vec![json!({ "name": "Sales, EMEA" })];
        let csv = records_to_csv(&records).unwrap();
        assert_eq!(csv, "name\n\"Sales, EMEA\"\n");
    }

    #[test]
    fn empty_record_set_renders_nothing() {
        assert_eq!(records_to_csv(&[]).unwrap(), "");
    }
}
