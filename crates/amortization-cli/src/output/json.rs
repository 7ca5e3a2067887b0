use serde_json::{json, Value};

/// Pretty-print JSON to stdout. A bare string result (rendered HTML) is
/// wrapped as `{"html": ...}` so the output is always a JSON object.
pub fn print_json(value: &Value) {
    let wrapped;
    let value = match value {
        Value::String(html) => {
            wrapped = json!({ "html": html });
            &wrapped
        }
        other => other,
    };

    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}
