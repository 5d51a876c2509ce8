use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Print a success message, merging `data` into the JSON form
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({ "success": true, "message": message });
            if let (Some(Value::Object(extra)), Some(obj)) = (data, response.as_object_mut()) {
                obj.extend(extra);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => println!("✓ {}", message),
    }
    Ok(())
}

/// Print rows as pretty JSON or as an aligned text table
pub fn output_rows<T: Serialize>(
    output_format: OutputFormat,
    key: &str,
    rows: &[T],
    headers: &[&str],
    cells: impl Fn(&T) -> Vec<String>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ key: rows }))?);
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No {} found", key);
                return Ok(());
            }
            let table: Vec<Vec<String>> = rows.iter().map(&cells).collect();
            let widths: Vec<usize> = headers
                .iter()
                .enumerate()
                .map(|(i, h)| table.iter().map(|r| r.get(i).map_or(0, |c| c.len())).max().unwrap_or(0).max(h.len()))
                .collect();

            let line = |values: Vec<String>| {
                values
                    .iter()
                    .zip(&widths)
                    .map(|(v, w)| format!("{:<width$}", v, width = *w))
                    .collect::<Vec<_>>()
                    .join("  ")
            };
            println!("{}", line(headers.iter().map(|h| h.to_string()).collect()));
            println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
            for row in table {
                println!("{}", line(row));
            }
        }
    }
    Ok(())
}
