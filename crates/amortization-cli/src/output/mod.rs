pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter. Rendered documents (a bare
/// string) are printed verbatim by every format except JSON.
pub fn format_output(format: &OutputFormat, value: &Value) {
    if let (Value::String(text), false) = (value, matches!(format, OutputFormat::Json)) {
        println!("{}", text);
        return;
    }

    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}
