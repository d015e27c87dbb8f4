//! Cell helpers over `serde_json::Value`.
//!
//! `Null` is the missing value. Numbers are either integers or finite floats;
//! anything that would be NaN or infinite is stored as `Null`.

use serde_json::Value;
use std::cmp::Ordering;

/// Build a float cell, mapping non-finite results to missing.
pub fn float(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Build a float cell from an optional value.
pub fn opt_float(v: Option<f64>) -> Value {
    v.map(float).unwrap_or(Value::Null)
}

/// Numeric view of a cell. Text and booleans are not numbers.
pub fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Lenient numeric coercion: numbers pass through, numeric text is parsed,
/// everything else becomes missing.
pub fn coerce_numeric(v: &Value) -> Value {
    match v {
        Value::Number(_) => v.clone(),
        Value::String(s) => parse_number(s.trim()).unwrap_or(Value::Null),
        Value::Bool(b) => Value::from(i64::from(*b)),
        _ => Value::Null,
    }
}

/// Parse text as an integer first, then as a finite float.
pub fn parse_number(s: &str) -> Option<Value> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::from(i));
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(float)
}

/// Hashable join/group key for a cell. Missing cells have no key.
///
/// Integral floats share the key of the equivalent integer, so `5` and `5.0`
/// land in the same group.
pub fn key_of(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(format!("s:{s}")),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(format!("n:{i}"))
            } else {
                let f = n.as_f64()?;
                if f.fract() == 0.0 && f.abs() < 9.0e15 {
                    Some(format!("n:{}", f as i64))
                } else {
                    Some(format!("n:{f}"))
                }
            }
        }
        other => Some(format!("j:{other}")),
    }
}

/// Total order used for sorting group keys: missing first, then numbers in
/// numeric order, then text in lexicographic order.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a)
            .cmp(&rank(b))
            .then_with(|| a.to_string().cmp(&b.to_string())),
    }
}

/// Text rendering of a cell (`Null` renders as the empty string).
pub fn to_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Narrow a cell to an integer when that loses nothing.
pub fn to_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            (f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
        }),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
