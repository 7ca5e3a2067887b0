use serde_json::Value;

/// Key figures in the order they are looked for. The first non-null one
/// found in the result (or its `totals`) is printed.
const PRIORITY_KEYS: [&str; 4] = [
    "representative_installment",
    "total_repayment",
    "final_payment",
    "total_interest",
];

/// Print just the headline figure: the installment a borrower pays.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let totals = result.get("totals").unwrap_or(result);

    if let Value::Object(map) = totals {
        let found = PRIORITY_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|val| !val.is_null());
        if let Some(val) = found {
            println!("{}", format_minimal(val));
            return;
        }
    }

    // Rows output: report how many installments were produced
    if let Value::Array(rows) = result {
        println!("{}", rows.len());
        return;
    }

    println!("{}", format_minimal(result));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
