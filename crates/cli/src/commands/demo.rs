use orderdesk_core::{AuditLog, OrderRuntime};
use serde_json::{json, Value};

use crate::commands::{audit_log, load_config, CommandResult, EXIT_OK};

pub fn sample_orders() -> Vec<(&'static str, Value)> {
    vec![
        (
            "ORD-1001",
            json!({
                "customer_tier": "Gold",
                "order_total": 1450.75,
                "new_customer": false,
                "item_category": "electronics",
                "stock_level": 3,
                "region": "US"
            }),
        ),
        (
            "ORD-1002",
            json!({
                "customer_tier": "Silver",
                "order_total": 220.0,
                "new_customer": true,
                "item_category": "apparel",
                "stock_level": 25,
                "region": "EU"
            }),
        ),
    ]
}

/// Evaluates and logs the sample orders without any orchestration layer.
pub fn run() -> CommandResult {
    let config = match load_config("demo") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = OrderRuntime::default();
    let log = audit_log(&config);

    let mut lines = vec!["=== Business Rules Demo ===".to_string()];
    let mut exit_code = EXIT_OK;

    for (order_id, order) in sample_orders() {
        lines.push(format!("-- {order_id} --"));
        let decision = runtime.respond(&order.to_string());
        lines.push(decision.clone());

        match log.append(order_id, &decision) {
            Ok(receipt) => lines.push(format!("Appended decision entry to {}", receipt.location)),
            Err(error) => {
                exit_code = crate::commands::exit_code_for(&error);
                lines.push(error.to_error_payload());
            }
        }
    }

    CommandResult::raw(exit_code, lines.join("\n"))
}
