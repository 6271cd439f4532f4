// used to print out readable forms of a value
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell in a data row.
///
/// Cells carry either a number, a piece of text, a boolean, or the missing
/// sentinel. Missing covers null and undefined in the caller-facing JSON
/// shape; an *empty* text value also counts as missing, which matches how
/// statistical packages treat blank string cells.
///
/// The untagged serde representation means rows serialize the way a UI layer
/// would hand them over: `[30, "M", null]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    Missing,
}

impl Value {
    /// Missing sentinel check: the missing variant itself or empty text.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Text(t) => t.is_empty(),
            _ => false,
        }
    }

    /// General truthiness, used for the final boolean coercion of a
    /// condition and for filter-variable selection: a value is falsy only
    /// when it is exactly zero (or NaN), empty text, `false`, or missing.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(t) => !t.is_empty(),
            Value::Bool(b) => *b,
            Value::Missing => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Render the value back into expression text as a literal: text is
    /// quoted, missing becomes `null`, numbers and booleans are bare.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Number(n) => render_number(*n),
            Value::Text(t) => format!("\"{}\"", t),
            Value::Bool(b) => b.to_string(),
            Value::Missing => String::from("null"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", render_number(*n)),
            Value::Text(t) => write!(f, "{}", t),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Missing => write!(f, "null"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}
impl From<&str> for Value {
    fn from(t: &str) -> Self {
        Value::Text(t.to_string())
    }
}
impl From<String> for Value {
    fn from(t: String) -> Self {
        Value::Text(t)
    }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Integral numbers print without a decimal point so that substituted
/// literals read the way users wrote them (`25`, not `25.0`).
pub fn render_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
