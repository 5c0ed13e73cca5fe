//! Output formatting for CLI commands.

use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

const CLI_SCHEMA_VERSION: &str = "booking.cli.v1";

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}

impl OutputFormat {
    /// Parse a format name; anything other than `json` means table.
    pub fn from_name(name: &str) -> Self {
        match name {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Table,
        }
    }
}

/// Print rows as a table, or `json` as schema-wrapped JSON.
pub fn print_rows<T: Tabled, J: Serialize + ?Sized>(rows: &[T], json: &J, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "No rows.".dimmed());
            } else {
                println!("{}", Table::new(rows));
            }
        }
        OutputFormat::Json => println!("{}", format_json(json, "{}")),
    }
}

/// Print a single item as schema-wrapped JSON.
pub fn print_single<T: Serialize + ?Sized>(data: &T) {
    println!("{}", format_json(data, "{}"));
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "Result:".green().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "Info:".blue().bold(), message);
}

/// Render a float with two decimals for table cells.
pub fn fmt_f64(value: &f64) -> String {
    format!("{value:.2}")
}

/// Render a half-open stage range for table cells.
pub fn fmt_stages(start: u64, end: u64) -> String {
    if end == start {
        "-".to_string()
    } else {
        format!("{}-{}", start, end - 1)
    }
}

/// Join integers with `/` for compact table cells.
pub fn fmt_limits(limits: &[u64]) -> String {
    limits
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

fn format_json<T: Serialize + ?Sized>(data: &T, fallback: &str) -> String {
    let value = serde_json::to_value(data).unwrap_or_else(|_| serde_json::json!({}));
    let wrapped = wrap_with_schema(value);
    let sorted = sort_json_value(wrapped);
    serde_json::to_string_pretty(&sorted).unwrap_or_else(|_| fallback.to_string())
}

fn wrap_with_schema(value: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "schemaVersion": CLI_SCHEMA_VERSION,
        "data": value
    })
}

fn sort_json_value(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Array(values) => {
            serde_json::Value::Array(values.into_iter().map(sort_json_value).collect())
        }
        serde_json::Value::Object(entries) => {
            let mut pairs: Vec<_> = entries.into_iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            let mut mapped = serde_json::Map::new();
            for (key, value) in pairs {
                mapped.insert(key, sort_json_value(value));
            }
            serde_json::Value::Object(mapped)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_json_wraps_with_schema() {
        let out = format_json(&serde_json::json!({ "min_capacity": 987 }), "{}");
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["schemaVersion"], CLI_SCHEMA_VERSION);
        assert_eq!(value["data"]["min_capacity"], 987);
    }

    #[test]
    fn sort_json_value_orders_nested_keys() {
        let value = sort_json_value(serde_json::json!({ "b": { "z": 1, "a": 2 }, "a": [] }));
        assert_eq!(value.to_string(), r#"{"a":[],"b":{"a":2,"z":1}}"#);
    }

    #[test]
    fn stage_ranges() {
        assert_eq!(fmt_stages(0, 20), "0-19");
        assert_eq!(fmt_stages(20, 21), "20-20");
        assert_eq!(fmt_stages(5, 5), "-");
    }

    #[test]
    fn limits_and_floats() {
        assert_eq!(fmt_limits(&[37, 18, 6]), "37/18/6");
        assert_eq!(fmt_f64(&187.5), "187.50");
    }

    #[test]
    fn format_names() {
        assert_eq!(OutputFormat::from_name("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_name("table"), OutputFormat::Table);
        assert_eq!(OutputFormat::from_name("yaml"), OutputFormat::Table);
    }
}
