//! Structured reply values.
//!
//! Assistant replies are sometimes a serialized JSON object. [`parse`] turns
//! reply text into a [`StructuredValue`] tree, keeping object keys in source
//! order, or reports an explicit [`ParseError`] when the text is not JSON.

use serde::Deserialize;
use serde_json::{Number, Value};
use thiserror::Error;

use super::with_stack;

/// Shape of a parsed reply.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<StructuredValue>),
    /// Key/value pairs in source order.
    Object(Vec<(String, StructuredValue)>),
}

/// Reply text that is not valid structured content.
#[derive(Debug, Error)]
#[error("not structured content: {0}")]
pub struct ParseError(#[from] serde_json::Error);

/// Parse reply text under the JSON grammar.
///
/// Leading and trailing whitespace is accepted; anything else after the
/// value is an error. A repeated key keeps the position of its first
/// occurrence and the value of its last.
///
/// Nesting depth is not limited.
pub fn parse(text: &str) -> Result<StructuredValue, ParseError> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(StructuredValue::from(value))
}

impl From<Value> for StructuredValue {
    fn from(value: Value) -> Self {
        with_stack(|| match value {
            Value::Null => StructuredValue::Null,
            Value::Bool(b) => StructuredValue::Bool(b),
            Value::Number(n) => StructuredValue::Number(n),
            Value::String(s) => StructuredValue::String(s),
            Value::Array(items) => {
                StructuredValue::Array(items.into_iter().map(StructuredValue::from).collect())
            }
            Value::Object(map) => StructuredValue::Object(
                map.into_iter()
                    .map(|(key, value)| (key, StructuredValue::from(value)))
                    .collect(),
            ),
        })
    }
}

impl StructuredValue {
    pub fn is_object(&self) -> bool {
        matches!(self, StructuredValue::Object(_))
    }
}

/// Canonical text of a JSON number.
///
/// Integers in the 64-bit range print exactly. Other numbers print the way
/// `Number.prototype.toString` does: plain decimal for magnitudes in
/// `[1e-6, 1e21)`, exponent form (`1e-7`, `1.5e+21`) outside it, no
/// trailing fractional zeros, and `0` for negative zero.
pub fn canonical_number(number: &Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    match number.as_f64() {
        Some(f) if f.is_finite() => float_text(f),
        _ => number.to_string(),
    }
}

fn float_text(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let sign = if f < 0.0 { "-" } else { "" };

    // `{:e}` gives the shortest round-trip digits, e.g. `1.2345e3`.
    let sci = format!("{:e}", f.abs());
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return f.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return f.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // Position of the decimal point relative to the first digit.
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat(n.unsigned_abs() as usize))
    } else {
        let e = n - 1;
        let e_sign = if e < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{e_sign}{}", e.unsigned_abs())
        } else {
            format!("{first}.{rest}e{e_sign}{}", e.unsigned_abs())
        }
    };
    format!("{sign}{body}")
}
