//! Capability-indexed dispatch for external callers.
//!
//! An orchestration layer names one of the two capabilities and passes its
//! arguments as JSON. Every call answers with a JSON string; failures are
//! returned as `{"error": ...}` rather than raised.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::audit::AuditLog;
use crate::errors::{ApplicationError, DomainError};
use crate::rules::{OrderRuntime, RuleEvaluator};
use crate::serializer::to_canonical_json;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    EvaluateOrderRules,
    LogDecision,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [Self::EvaluateOrderRules, Self::LogDecision];

    pub fn name(self) -> &'static str {
        match self {
            Self::EvaluateOrderRules => "evaluate_order_rules",
            Self::LogDecision => "log_decision",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::EvaluateOrderRules => {
                "Evaluate business rules for an order and return the decision JSON"
            }
            Self::LogDecision => "Append a timestamped decision record to the named audit log",
        }
    }
}

impl FromStr for ToolKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == value.trim())
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown tool `{value}`")))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

pub struct ToolDispatcher<E, L> {
    runtime: OrderRuntime<E>,
    audit_log: L,
}

impl<E, L> ToolDispatcher<E, L> {
    pub fn new(runtime: OrderRuntime<E>, audit_log: L) -> Self {
        Self { runtime, audit_log }
    }

    pub fn audit_log(&self) -> &L {
        &self.audit_log
    }
}

impl<E: RuleEvaluator, L: AuditLog> ToolDispatcher<E, L> {
    /// Parses a `{"tool": ..., "arguments": {...}}` request and dispatches it.
    pub fn handle(&self, raw_request: &str) -> String {
        match serde_json::from_str::<ToolRequest>(raw_request) {
            Ok(request) => self.dispatch(&request),
            Err(error) => ApplicationError::from(DomainError::InvalidInput(format!(
                "invalid tool request: {error}"
            )))
            .to_error_payload(),
        }
    }

    pub fn dispatch(&self, request: &ToolRequest) -> String {
        let correlation_id = Uuid::new_v4().to_string();
        let result = request
            .tool
            .parse::<ToolKind>()
            .map_err(ApplicationError::from)
            .and_then(|kind| {
                tracing::info!(
                    event_name = "tools.dispatch",
                    tool = kind.name(),
                    correlation_id = %correlation_id,
                    "dispatching tool request"
                );
                match kind {
                    ToolKind::EvaluateOrderRules => self.evaluate_order_rules(&request.arguments),
                    ToolKind::LogDecision => self.log_decision(&request.arguments),
                }
            });

        match result {
            Ok(output) => output,
            Err(error) => {
                tracing::warn!(
                    event_name = "tools.dispatch_failed",
                    tool = %request.tool,
                    correlation_id = %correlation_id,
                    error_kind = ?error.kind(),
                    error = %error,
                    "tool request failed"
                );
                error.to_error_payload()
            }
        }
    }

    fn evaluate_order_rules(&self, arguments: &Value) -> Result<String, ApplicationError> {
        let order = required_argument(arguments, "order")?;
        let evaluation = match order {
            Value::String(raw) => self.runtime.evaluate_str(raw)?,
            other => self.runtime.evaluate_value(other)?,
        };
        to_canonical_json(&evaluation.decision)
    }

    fn log_decision(&self, arguments: &Value) -> Result<String, ApplicationError> {
        let name = match required_argument(arguments, "name")? {
            Value::String(name) => name.as_str(),
            _ => return Err(DomainError::type_mismatch("name", "expected a string").into()),
        };
        let payload = match required_argument(arguments, "decision")? {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        };

        self.audit_log.append(name, &payload)?.to_confirmation_json()
    }
}

fn required_argument<'a>(arguments: &'a Value, key: &str) -> Result<&'a Value, ApplicationError> {
    arguments
        .get(key)
        .filter(|value| !value.is_null())
        .ok_or_else(|| DomainError::InvalidInput(format!("missing argument `{key}`")).into())
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{ToolDispatcher, ToolKind, ToolRequest};
    use crate::audit::{AuditLog, InMemoryAuditLog};
    use crate::rules::OrderRuntime;

    fn dispatcher() -> ToolDispatcher<crate::rules::DeterministicRuleEvaluator, InMemoryAuditLog> {
        ToolDispatcher::new(OrderRuntime::default(), InMemoryAuditLog::default())
    }

    fn parse(output: &str) -> Value {
        serde_json::from_str(output).expect("tool output is JSON")
    }

    #[test]
    fn tool_names_resolve_to_capabilities() {
        assert_eq!("evaluate_order_rules".parse::<ToolKind>(), Ok(ToolKind::EvaluateOrderRules));
        assert_eq!("log_decision".parse::<ToolKind>(), Ok(ToolKind::LogDecision));
        assert!("fetch_url".parse::<ToolKind>().is_err());
    }

    #[test]
    fn evaluate_accepts_object_or_encoded_string() {
        let dispatcher = dispatcher();
        let order = json!({ "customer_tier": "Gold", "order_total": 50 });

        let from_object = dispatcher.dispatch(&ToolRequest {
            tool: "evaluate_order_rules".to_string(),
            arguments: json!({ "order": order.clone() }),
        });
        let from_string = dispatcher.dispatch(&ToolRequest {
            tool: "evaluate_order_rules".to_string(),
            arguments: json!({ "order": order.to_string() }),
        });

        assert_eq!(from_object, from_string);
        assert_eq!(parse(&from_object)["discount_percent"], 10.0);
    }

    #[test]
    fn evaluate_then_log_round_trip_through_dispatcher() {
        let dispatcher = dispatcher();
        let decision = dispatcher.handle(
            r#"{"tool":"evaluate_order_rules","arguments":{"order":{"customer_tier":"Silver","order_total":220}}}"#,
        );
        let request = json!({
            "tool": "log_decision",
            "arguments": { "name": "ORD-1002", "decision": decision.clone() }
        });

        let confirmation = parse(&dispatcher.handle(&request.to_string()));
        assert_eq!(confirmation["status"], "ok");
        assert_eq!(confirmation["log_id"], "ORD-1002");

        let entries = dispatcher.audit_log().entries("ORD-1002").expect("entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].payload, decision);
    }

    #[test]
    fn failures_are_returned_as_error_objects() {
        let dispatcher = dispatcher();

        let unknown = parse(&dispatcher.handle(r#"{"tool":"delete_everything"}"#));
        assert!(unknown["error"].as_str().unwrap_or_default().contains("unknown tool"));

        let missing = parse(&dispatcher.handle(r#"{"tool":"log_decision","arguments":{}}"#));
        assert!(missing["error"].as_str().unwrap_or_default().contains("missing argument"));

        let garbage = parse(&dispatcher.handle("tool please"));
        assert!(garbage["error"].as_str().unwrap_or_default().contains("invalid tool request"));

        let bad_order = parse(&dispatcher.handle(
            r#"{"tool":"evaluate_order_rules","arguments":{"order":"{oops"}}"#,
        ));
        assert!(bad_order["error"].as_str().unwrap_or_default().contains("invalid JSON"));
    }
}
