//! Output formatting utilities

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

use tabled::{Table, settings::Style};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    JsonPretty,
    Table,
}

impl OutputFormat {
    /// Parse a `--format` value; unknown values fall back to the default
    pub fn parse(s: &str, default: Self) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" | "json-pretty" => Self::JsonPretty,
            "table" => Self::Table,
            _ => default,
        }
    }

    /// Resolve an optional `--format` value
    pub fn resolve(s: Option<&str>, default: Self) -> Self {
        s.map_or(default, |s| Self::parse(s, default))
    }
}

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(io::stdout().is_terminal()),
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Format diagnostic information (file:line:col)
pub fn format_location(file: &str, line: usize, col: usize) -> String {
    format!("{}:{}:{}", file.cyan(), line, col)
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Format JSON value for output
pub fn format_json(value: &Value, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to serialize JSON")
    } else {
        serde_json::to_string(value).context("Failed to serialize JSON")
    }
}

/// Format a list of flat objects as a table, one row per object.
///
/// Columns come from the first object, in its key order.
pub fn format_as_table(rows: &[Value]) -> Option<String> {
    let Some(Value::Object(first)) = rows.first() else {
        return if rows.is_empty() {
            Some("(empty list)".to_string())
        } else {
            None
        };
    };
    let keys: Vec<&String> = first.keys().collect();

    let mut builder = tabled::builder::Builder::default();
    builder.push_record(keys.iter().map(|k| k.to_string()));
    for row in rows {
        let Value::Object(obj) = row else {
            return None;
        };
        builder.push_record(keys.iter().map(|k| obj.get(*k).map(format_value).unwrap_or_default()));
    }
    let mut table: Table = builder.build();
    Some(table.with(Style::modern()).to_string())
}

/// Format a simple value for display
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{}} with {} fields", obj.len()),
    }
}

/// Print rows in the specified format
pub fn print_rows(rows: &[Value], format: OutputFormat, output_file: Option<&Path>) -> Result<()> {
    let value = Value::Array(rows.to_vec());
    let content = match format {
        OutputFormat::Json => format_json(&value, false)?,
        OutputFormat::JsonPretty => format_json(&value, true)?,
        OutputFormat::Table => match format_as_table(rows) {
            Some(table) => table,
            None => format_json(&value, true)?,
        },
    };

    write_output(&content, output_file)
}
