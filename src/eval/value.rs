//! Value helpers: type names, truthiness, equality and string coercion
//!
//! Printing follows one rule everywhere a value becomes text (the `print`
//! directive, `+` concatenation, `join`, `str`):
//!
//! - numbers render in canonical decimal form, integral values without a
//!   fraction (`19`, not `19.0`)
//! - strings render unchanged
//! - booleans render as `true` / `false`
//! - `null`, arrays and objects have no text form and raise
//!   [`RenderError::Unprintable`]

use serde_json::{Number, Value};

use crate::error::RenderError;

/// 2^63, the first integral f64 outside the `i64` range
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Name of a value's type for error messages
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `null`, `false`, `0` and `""` are falsy; everything else is truthy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Structural equality where numbers compare by value (`1 == 1.0`)
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Build a number value from an arithmetic result
///
/// Integral results are stored as integers so they print without a fraction.
pub fn number(value: f64, op: &'static str) -> Result<Value, RenderError> {
    if !value.is_finite() {
        return Err(RenderError::NonFinite { op });
    }
    if value.fract() == 0.0 && value.abs() < I64_LIMIT {
        return Ok(Value::Number(Number::from(value as i64)));
    }
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or(RenderError::NonFinite { op })
}

/// Numeric view of a value, if it is a number
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Canonical decimal text: no exponent, no fraction on integral values
fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        // `-0` prints as `0`
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < I64_LIMIT => (f as i64).to_string(),
        // f64 `Display` writes the shortest round-trip digits in plain decimal
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// String coercion used for printing and concatenation
pub fn to_text(value: &Value) -> Result<String, RenderError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(format_number(n)),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(RenderError::Unprintable { kind: kind(other) }),
    }
}
