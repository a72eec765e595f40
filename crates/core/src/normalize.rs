//! Turns loosely-typed order JSON into a canonical [`OrderInput`].
//!
//! Absent keys and explicit `null`s take their defaults. Present values of the
//! wrong semantic type are reported as [`DomainError::TypeMismatch`] rather
//! than silently defaulted.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};

use crate::domain::order::{CustomerTier, OrderInput, DEFAULT_ITEM_CATEGORY, DEFAULT_REGION};
use crate::errors::DomainError;

pub fn normalize_order(raw: &str) -> Result<OrderInput, DomainError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|error| DomainError::InvalidInput(format!("invalid JSON: {error}")))?;
    normalize_value(&value)
}

pub fn normalize_value(value: &Value) -> Result<OrderInput, DomainError> {
    let Some(record) = value.as_object() else {
        return Err(DomainError::InvalidInput(format!(
            "order must be a JSON object, found {}",
            describe(value)
        )));
    };

    let customer_tier = match text_field(record, "customer_tier")? {
        Some(label) => CustomerTier::from_label(&label),
        None => CustomerTier::Bronze,
    };
    let order_total = decimal_field(record, "order_total")?.unwrap_or(Decimal::ZERO);
    let new_customer = bool_field(record, "new_customer")?.unwrap_or(false);
    let item_category = text_field(record, "item_category")?
        .unwrap_or_else(|| DEFAULT_ITEM_CATEGORY.to_string());
    let stock_level = count_field(record, "stock_level")?.unwrap_or(0);
    let region = text_field(record, "region")?.unwrap_or_else(|| DEFAULT_REGION.to_string());

    Ok(OrderInput::from_parts(
        customer_tier,
        order_total,
        new_customer,
        &item_category,
        stock_level,
        &region,
    ))
}

fn present<'a>(record: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    record.get(field).filter(|value| !value.is_null())
}

fn text_field(record: &Map<String, Value>, field: &str) -> Result<Option<String>, DomainError> {
    match present(record, field) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.trim().to_string())),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(DomainError::type_mismatch(
            field,
            format!("expected a string, found {}", describe(other)),
        )),
    }
}

fn decimal_field(record: &Map<String, Value>, field: &str) -> Result<Option<Decimal>, DomainError> {
    let parsed = match present(record, field) {
        None => return Ok(None),
        Some(Value::Number(number)) => parse_decimal(&number.to_string()),
        Some(Value::String(text)) => parse_decimal(text.trim()),
        Some(other) => {
            return Err(DomainError::type_mismatch(
                field,
                format!("expected a number, found {}", describe(other)),
            ))
        }
    };

    let amount = parsed.ok_or_else(|| {
        DomainError::type_mismatch(field, "value cannot be interpreted as a decimal number")
    })?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::type_mismatch(field, format!("must be non-negative, got {amount}")));
    }

    Ok(Some(amount))
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.contains(['e', 'E']) {
        return Decimal::from_scientific(text).ok();
    }
    Decimal::from_str(text).ok()
}

fn bool_field(record: &Map<String, Value>, field: &str) -> Result<Option<bool>, DomainError> {
    match present(record, field) {
        None => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(Value::Number(number)) => Ok(Some(number.as_f64().is_some_and(|n| n != 0.0))),
        Some(Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Some(true)),
            "false" | "no" | "0" => Ok(Some(false)),
            other => Err(DomainError::type_mismatch(
                field,
                format!("`{other}` is not a recognized boolean"),
            )),
        },
        Some(other) => Err(DomainError::type_mismatch(
            field,
            format!("expected a boolean, found {}", describe(other)),
        )),
    }
}

fn count_field(record: &Map<String, Value>, field: &str) -> Result<Option<u64>, DomainError> {
    match present(record, field) {
        None => Ok(None),
        Some(Value::Number(number)) => count_from_number(number)
            .map(Some)
            .ok_or_else(|| DomainError::type_mismatch(field, "must be a non-negative integer")),
        Some(Value::String(text)) => text
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| DomainError::type_mismatch(field, format!("`{text}` is not an integer"))),
        Some(other) => Err(DomainError::type_mismatch(
            field,
            format!("expected an integer, found {}", describe(other)),
        )),
    }
}

fn count_from_number(number: &Number) -> Option<u64> {
    if let Some(count) = number.as_u64() {
        return Some(count);
    }
    if number.as_i64().is_some() {
        return None;
    }

    // Fractional counts truncate toward zero.
    let truncated = number.as_f64()?.trunc();
    (truncated.is_finite() && truncated >= 0.0 && truncated <= u64::MAX as f64)
        .then_some(truncated as u64)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
