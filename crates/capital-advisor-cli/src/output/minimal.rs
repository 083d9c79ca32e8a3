use serde_json::Value;

use super::format_scalar;

/// Headline figure per command, tried in order.
const PRIORITY_PATHS: &[&[&str]] = &[
    &["best_scenario"],
    &["summary", "median"],
    &["equity_value"],
    &["wacc"],
    &["summary", "owner_value_change_pct"],
];

/// Print just the headline value of the result.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    for path in PRIORITY_PATHS {
        if let Some(val) = lookup(result, path) {
            if !val.is_null() {
                println!("{}", format_scalar(val));
                return;
            }
        }
    }

    if let Some((key, val)) = result.as_object().and_then(|m| m.iter().next()) {
        println!("{key}: {}", format_scalar(val));
        return;
    }

    println!("{}", format_scalar(result));
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(*key))
}
