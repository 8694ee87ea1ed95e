use serde_json::Value;

use super::cell;

/// Headline figures, most specific first. Dotted paths reach into nested
/// result objects.
const PRIORITY_PATHS: [&str; 6] = [
    "returns.total_return_percent",
    "net_monthly_cash_flow",
    "monthly_payment",
    "total_monthly_rent",
    "cash_flow.net_monthly_cash_flow",
    "cap_rate_percent",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = value.get("result").unwrap_or(value);

    for path in PRIORITY_PATHS {
        if let Some(val) = lookup(result, path).filter(|v| !v.is_null()) {
            println!("{}", cell(val));
            return;
        }
    }

    // Schedules: report the final row's balance
    if let Some(last) = result.as_array().and_then(|a| a.last()) {
        if let Some(balance) = last.get("remaining_balance") {
            println!("{}", cell(balance));
            return;
        }
    }

    if let Some((key, val)) = result.as_object().and_then(|m| m.iter().next()) {
        println!("{}: {}", key, cell(val));
        return;
    }

    println!("{}", cell(result));
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |v, key| v.get(key))
}
