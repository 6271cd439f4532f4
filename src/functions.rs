//! The fixed catalog of functions usable inside condition expressions.
//!
//! Functions are applied during the flat substitution pass: each argument is
//! a single textual token (a literal or a variable name), never a nested
//! call or a sub-expression. Arguments are resolved against the current
//! row's name→value map before the function computes, except for
//! `MISSING`/`NMISS`, which operate on the variable names themselves.

use crate::datatype::Value;
use crate::error::{EngineError, Result};
use crate::schema::ValueMap;

/// Apply one catalog function to its raw (trimmed, unresolved) arguments.
/// Function names are matched case-insensitively.
pub fn call(name: &str, args: &[&str], values: &ValueMap) -> Result<Value> {
    match name.to_ascii_uppercase().as_str() {
        // math
        "ABS" => {
            let x = single_number("ABS", args, values)?;
            Ok(Value::Number(x.abs()))
        }
        "SQRT" => {
            let x = single_number("SQRT", args, values)?;
            if x < 0.0 {
                return Err(domain("SQRT", "negative input"));
            }
            Ok(Value::Number(x.sqrt()))
        }
        "ROUND" => {
            let x = single_number("ROUND", args, values)?;
            Ok(Value::Number(x.round()))
        }
        "FLOOR" => {
            let x = single_number("FLOOR", args, values)?;
            Ok(Value::Number(x.floor()))
        }
        "CEIL" => {
            let x = single_number("CEIL", args, values)?;
            Ok(Value::Number(x.ceil()))
        }
        "INT" => {
            let x = single_number("INT", args, values)?;
            Ok(Value::Number(x.trunc()))
        }
        "MAX" => {
            let xs = numbers("MAX", args, values, 1)?;
            Ok(Value::Number(xs.into_iter().fold(f64::NEG_INFINITY, f64::max)))
        }
        "MIN" => {
            let xs = numbers("MIN", args, values, 1)?;
            Ok(Value::Number(xs.into_iter().fold(f64::INFINITY, f64::min)))
        }
        "SUM" => {
            let xs = numbers("SUM", args, values, 1)?;
            Ok(Value::Number(xs.iter().sum()))
        }
        "POW" => {
            exactly("POW", args, 2)?;
            let base = number("POW", args[0], values)?;
            let exponent = number("POW", args[1], values)?;
            Ok(Value::Number(base.powf(exponent)))
        }
        "EXP" => {
            let x = single_number("EXP", args, values)?;
            Ok(Value::Number(x.exp()))
        }
        "LOG" | "LOG10" => {
            let x = single_number("LOG", args, values)?;
            if x <= 0.0 {
                return Err(domain("LOG", "non-positive input"));
            }
            Ok(Value::Number(x.log10()))
        }
        // statistical
        "MEAN" => {
            let xs = numbers("MEAN", args, values, 1)?;
            Ok(Value::Number(xs.iter().sum::<f64>() / xs.len() as f64))
        }
        "MEDIAN" => {
            let mut xs = numbers("MEDIAN", args, values, 1)?;
            xs.sort_by(|a, b| a.total_cmp(b));
            let mid = xs.len() / 2;
            let median = if xs.len() % 2 == 1 {
                xs[mid]
            } else {
                (xs[mid - 1] + xs[mid]) / 2.0
            };
            Ok(Value::Number(median))
        }
        "SD" => {
            let xs = numbers("SD", args, values, 2)?;
            let mean = xs.iter().sum::<f64>() / xs.len() as f64;
            // sample standard deviation, n - 1 in the denominator
            let variance =
                xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (xs.len() - 1) as f64;
            Ok(Value::Number(variance.sqrt()))
        }
        "MISSING" => {
            exactly("MISSING", args, 1)?;
            Ok(Value::Bool(variable_value(args[0], values)?.is_missing()))
        }
        "NMISS" => {
            at_least("NMISS", args, 1)?;
            let mut count = 0usize;
            for arg in args {
                if variable_value(arg, values)?.is_missing() {
                    count += 1;
                }
            }
            Ok(Value::Number(count as f64))
        }
        "COUNT" => Ok(Value::Number(args.len() as f64)),
        // text
        "CONCAT" => {
            let mut joined = String::new();
            for arg in args {
                joined.push_str(&text("CONCAT", arg, values)?);
            }
            Ok(Value::Text(joined))
        }
        "LENGTH" => {
            exactly("LENGTH", args, 1)?;
            let t = text("LENGTH", args[0], values)?;
            Ok(Value::Number(t.chars().count() as f64))
        }
        "LOWER" => {
            exactly("LOWER", args, 1)?;
            Ok(Value::Text(text("LOWER", args[0], values)?.to_lowercase()))
        }
        "UPPER" => {
            exactly("UPPER", args, 1)?;
            Ok(Value::Text(text("UPPER", args[0], values)?.to_uppercase()))
        }
        "TRIM" => {
            exactly("TRIM", args, 1)?;
            Ok(Value::Text(text("TRIM", args[0], values)?.trim().to_string()))
        }
        "SUBSTR" => substr(args, values),
        "REPLACE" => {
            exactly("REPLACE", args, 3)?;
            let subject = text("REPLACE", args[0], values)?;
            let pattern = text("REPLACE", args[1], values)?;
            let replacement = text("REPLACE", args[2], values)?;
            // the search argument is a pattern and every occurrence is replaced
            let re = regex::Regex::new(&pattern)
                .map_err(|e| EngineError::Evaluation(format!("bad REPLACE pattern: {e}")))?;
            Ok(Value::Text(re.replace_all(&subject, replacement.as_str()).into_owned()))
        }
        // conditional
        "IF" => {
            exactly("IF", args, 3)?;
            let condition = resolve(args[0], values)?;
            let branch = if if_truthy(&condition) { args[1] } else { args[2] };
            resolve(branch, values)
        }
        other => Err(EngineError::UnknownFunction(other.to_string())),
    }
}

/// `SUBSTR(str, start[, len])` with a 1-based inclusive start, clamped to
/// the end of the text. Operates on characters, not bytes.
fn substr(args: &[&str], values: &ValueMap) -> Result<Value> {
    if args.len() < 2 || args.len() > 3 {
        return Err(EngineError::Arity {
            function: String::from("SUBSTR"),
            message: format!("expected 2 or 3, got {}", args.len()),
        });
    }
    let subject = text("SUBSTR", args[0], values)?;
    let start = number("SUBSTR", args[1], values)?;
    if start < 1.0 || start.fract() != 0.0 {
        return Err(domain("SUBSTR", "start must be a positive whole number"));
    }
    let skip = start as usize - 1;
    let taken: String = if args.len() == 3 {
        let len = number("SUBSTR", args[2], values)?;
        if len < 0.0 || len.fract() != 0.0 {
            return Err(domain("SUBSTR", "length must be a non-negative whole number"));
        }
        subject.chars().skip(skip).take(len as usize).collect()
    } else {
        subject.chars().skip(skip).collect()
    };
    Ok(Value::Text(taken))
}

/// The `IF` condition rule: truthy when the argument is the text `"true"`
/// or `"1"`, or resolves/parses to a nonzero number.
fn if_truthy(condition: &Value) -> bool {
    match condition {
        Value::Text(t) => {
            t == "true" || t == "1" || t.parse::<f64>().map(|n| n != 0.0).unwrap_or(false)
        }
        Value::Number(n) => *n != 0.0,
        Value::Bool(b) => *b,
        Value::Missing => false,
    }
}

/// Resolve one raw argument token: a quoted string, a numeric literal,
/// `null`, `true`/`false`, or a schema variable name looked up in the
/// current row. Anything else is an unknown token.
fn resolve(token: &str, values: &ValueMap) -> Result<Value> {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        return Ok(Value::Text(token[1..token.len() - 1].to_string()));
    }
    match token {
        "null" => return Ok(Value::Missing),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => (),
    }
    if let Ok(n) = token.parse::<f64>() {
        return Ok(Value::Number(n));
    }
    match values.get(token) {
        Some(value) => Ok((*value).clone()),
        None => Err(EngineError::UnknownVariable(token.to_string())),
    }
}

/// Look up an argument that must be a variable name (for `MISSING`/`NMISS`).
fn variable_value<'a>(token: &str, values: &'a ValueMap) -> Result<&'a Value> {
    values
        .get(token)
        .copied()
        .ok_or_else(|| EngineError::UnknownVariable(token.to_string()))
}

fn number(function: &str, token: &str, values: &ValueMap) -> Result<f64> {
    let value = resolve(token, values)?;
    value.as_number().ok_or_else(|| {
        EngineError::TypeMismatch(format!("{function} expects numbers, got {value}"))
    })
}

fn single_number(function: &str, args: &[&str], values: &ValueMap) -> Result<f64> {
    exactly(function, args, 1)?;
    number(function, args[0], values)
}

fn numbers(function: &str, args: &[&str], values: &ValueMap, minimum: usize) -> Result<Vec<f64>> {
    at_least(function, args, minimum)?;
    args.iter().map(|arg| number(function, arg, values)).collect()
}

fn text(function: &str, token: &str, values: &ValueMap) -> Result<String> {
    match resolve(token, values)? {
        Value::Text(t) => Ok(t),
        Value::Number(n) => Ok(crate::datatype::render_number(n)),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Missing => Err(EngineError::TypeMismatch(format!(
            "{function} cannot take a missing value"
        ))),
    }
}

fn exactly(function: &str, args: &[&str], n: usize) -> Result<()> {
    if args.len() != n {
        return Err(EngineError::Arity {
            function: function.to_string(),
            message: format!("expected {n}, got {}", args.len()),
        });
    }
    Ok(())
}

fn at_least(function: &str, args: &[&str], n: usize) -> Result<()> {
    if args.len() < n {
        return Err(EngineError::Arity {
            function: function.to_string(),
            message: format!("expected at least {n}, got {}", args.len()),
        });
    }
    Ok(())
}

fn domain(function: &str, message: &str) -> EngineError {
    EngineError::Domain {
        function: function.to_string(),
        message: message.to_string(),
    }
}
