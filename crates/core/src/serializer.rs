use std::fmt::Display;

use serde::Serialize;
use serde_json::Value;

use crate::domain::decision::OrderDecision;
use crate::errors::{ApplicationError, DomainError};

pub fn to_canonical_json(decision: &OrderDecision) -> Result<String, ApplicationError> {
    serde_json::to_string(decision).map_err(|error| ApplicationError::Serialization(error.to_string()))
}

pub fn from_canonical_json(raw: &str) -> Result<OrderDecision, DomainError> {
    serde_json::from_str(raw)
        .map_err(|error| DomainError::InvalidInput(format!("not a decision record: {error}")))
}

/// Renders an audit payload on a single line.
///
/// JSON is compacted through an untyped value, so key order, value types and
/// magnitudes are kept exactly. Anything unparseable is kept as-is apart from escaping backslashes and line breaks.
pub fn canonicalize_payload(payload: &str) -> String {
    match serde_json::from_str::<Value>(payload) {
        Ok(value) => value.to_string(),
        Err(_) => payload.replace('\\', "\\\\").replace('\r', "\\r").replace('\n', "\\n"),
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

pub fn error_payload(message: &impl Display) -> String {
    let message = message.to_string();
    serde_json::to_string(&ErrorBody { error: &message }).unwrap_or_else(|_| {
        format!(
            "{{\"error\":\"{}\"}}",
            message.replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
