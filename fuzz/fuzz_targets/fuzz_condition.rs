// Fuzz target exploring condition parsing and evaluation under arbitrary input.
#![no_main]

use libfuzzer_sys::fuzz_target;
use mandate_rules::Expr;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        return;
    };

    let context = serde_json::json!({
        "input": {
            "size": { "employee_count_total": 42 },
            "locations": { "online_sales_states": ["IL", "NY"] }
        },
        "derived": { "us_presence": true, "thresholds": { "gte_10": true } }
    });

    if let Ok(expr) = Expr::from_value(&value) {
        let _ = expr.evaluate(&context);
        let _ = expr.evaluate(&value);
    }
});
