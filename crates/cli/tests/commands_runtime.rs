use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use orderdesk_cli::commands::{call, demo, evaluate, history, log};
use serde_json::Value;
use tempfile::TempDir;

const GOLD_ORDER: &str = r#"{"customer_tier":"Gold","order_total":1450.75,"new_customer":false,"item_category":"electronics","stock_level":3,"region":"US"}"#;

#[test]
fn evaluate_prints_decision_without_touching_storage() {
    with_audit_dir(|dir| {
        let result = evaluate::run(evaluate::EvaluateArgs {
            input: Some(GOLD_ORDER.to_string()),
            ..evaluate::EvaluateArgs::default()
        });
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["discount_percent"], 10.0);
        assert_eq!(payload["require_manual_review"], true);
        assert_eq!(payload["free_shipping"], true);
        assert!(!dir.exists(), "no audit directory should be created without --log-id");
    });
}

#[test]
fn evaluate_with_log_id_appends_one_line() {
    with_audit_dir(|dir| {
        let result = evaluate::run(evaluate::EvaluateArgs {
            input: Some(GOLD_ORDER.to_string()),
            log_id: Some("ORD-1001".to_string()),
            ..evaluate::EvaluateArgs::default()
        });
        assert_eq!(result.exit_code, 0, "unexpected output: {}", result.output);

        let decision_line = first_line(&result.output);
        let confirmation = parse_payload(last_line(&result.output));
        assert_eq!(confirmation["status"], "ok");
        assert_eq!(confirmation["log_id"], "ORD-1001");

        let raw = fs::read_to_string(dir.join("ORD-1001.log")).expect("log file written");
        assert_eq!(raw.lines().count(), 1);
        assert!(raw.ends_with(&format!("] {decision_line}\n")));
    });
}

#[test]
fn evaluate_reports_malformed_input_as_error_object() {
    with_audit_dir(|_| {
        let result = evaluate::run(evaluate::EvaluateArgs {
            input: Some("{customer_tier: Gold".to_string()),
            ..evaluate::EvaluateArgs::default()
        });
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert!(payload["error"].as_str().unwrap_or_default().contains("invalid JSON"));
    });
}

#[test]
fn evaluate_reads_order_from_file() {
    with_audit_dir(|dir| {
        let scratch = dir.ancestors().nth(2).expect("scratch root exists").join("order.json");
        fs::write(
            &scratch,
            r#"{"customer_tier":"Bronze","order_total":50,"item_category":"groceries","stock_level":1}"#,
        )
        .expect("write order file");

        let result = evaluate::run(evaluate::EvaluateArgs {
            file: Some(scratch),
            ..evaluate::EvaluateArgs::default()
        });
        let payload = parse_payload(&result.output);
        assert_eq!(payload["discount_percent"], 0.0);
        assert_eq!(payload["free_shipping"], false);
        assert_eq!(payload["require_manual_review"], false);
    });
}

#[test]
fn log_then_history_preserves_append_order() {
    with_audit_dir(|_| {
        for payload in [r#"{"seq":1}"#, "not json", r#"{ "seq": 3 }"#] {
            let result = log::run("ORD-9", Some(payload.to_string()));
            assert_eq!(result.exit_code, 0, "unexpected output: {}", result.output);
        }

        let result = history::run("ORD-9", true);
        assert_eq!(result.exit_code, 0);
        let entries = parse_payload(&result.output);
        let payloads: Vec<&str> = entries
            .as_array()
            .map(|entries| entries.iter().filter_map(|entry| entry["payload"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(payloads, vec![r#"{"seq":1}"#, "not json", r#"{"seq":3}"#]);
    });
}

#[test]
fn log_rejects_path_like_ids_as_storage_failure() {
    with_audit_dir(|_| {
        let result = log::run("../outside", Some("{}".to_string()));
        assert_eq!(result.exit_code, 3);
        assert!(parse_payload(&result.output)["error"].is_string());
    });
}

#[test]
fn call_dispatches_log_decision() {
    with_audit_dir(|dir| {
        let request = r#"{"tool":"log_decision","arguments":{"name":"ORD-5","decision":{"discount_percent":0.0,"free_shipping":false,"require_manual_review":false,"notes":[],"rationale":"Standard rules applied"}}}"#;
        let result = call::run(Some(request.to_string()));
        assert_eq!(result.exit_code, 0, "unexpected output: {}", result.output);
        assert!(dir.join("ORD-5.log").exists());

        let unknown = call::run(Some(r#"{"tool":"summarize"}"#.to_string()));
        assert_eq!(unknown.exit_code, 2);
    });
}

#[test]
fn demo_logs_both_sample_orders() {
    with_audit_dir(|dir| {
        let result = demo::run();
        assert_eq!(result.exit_code, 0, "unexpected output: {}", result.output);
        assert!(result.output.contains("-- ORD-1001 --"));
        assert!(result.output.contains("-- ORD-1002 --"));

        let silver = fs::read_to_string(dir.join("ORD-1002.log")).expect("ORD-1002 logged");
        assert!(silver.contains(r#""discount_percent":7.0"#));
        assert!(silver.contains("EU region"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn first_line(output: &str) -> &str {
    output.lines().next().unwrap_or_default()
}

fn last_line(output: &str) -> &str {
    output.lines().last().unwrap_or_default()
}

fn with_audit_dir(test_fn: impl FnOnce(&Path)) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let scratch = TempDir::new().expect("tempdir");
    let audit_dir = scratch.path().join("runlogs").join("business_rules");
    env::set_var("ORDERDESK_AUDIT_BASE_DIR", &audit_dir);
    for key in ["ORDERDESK_LOGGING_LEVEL", "ORDERDESK_LOG_LEVEL"] {
        env::remove_var(key);
    }

    test_fn(&audit_dir);

    env::remove_var("ORDERDESK_AUDIT_BASE_DIR");
}
