//! The condition evaluator: decides whether one data row satisfies a
//! condition expression such as `age > 25 & gender == "M"`.
//!
//! Evaluation is a pipeline of passes over the expression text:
//!
//! 1. *Function substitution* — recognized `NAME(arg, ...)` calls are
//!    computed via the [`crate::functions`] catalog and rendered back into
//!    the text as literals. Call-shaped text inside a string literal is
//!    skipped. The scan is a single, flat pass: a call nested
//!    inside another call's arguments is not substituted, and the leftover
//!    outer name later fails to parse. This is a documented constraint of
//!    the mini-language, not an oversight.
//! 2. *Variable substitution* — every schema variable name appearing as a
//!    whole word is replaced by its row value rendered as a literal
//!    (quoted text, `null` for missing, bare numbers).
//! 3. *Operator normalization* — `&`, `|` and `~` become `&&`, `||` and
//!    `!` outside string literals.
//! 4. *Parse and evaluate* — the literal-only text is parsed with the
//!    grammar in `condition.pest` into a small AST and tree-walked to a
//!    value, whose truthiness is the verdict.
//!
//! The public entry point never fails: any error anywhere in the pipeline
//! (malformed syntax, unknown tokens, math domain errors, arithmetic on
//! missing values) makes the row evaluate to `false`.

use lazy_static::lazy_static;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;
use pest_derive::Parser;
use regex::{NoExpand, Regex};
use tracing::debug;

use crate::datatype::Value;
use crate::error::{EngineError, Result};
use crate::functions;
use crate::schema::{Schema, ValueMap};

#[derive(Parser)]
#[grammar = "condition.pest"]
struct ConditionParser;

lazy_static! {
    // A flat call: a name followed by an argument list free of parentheses.
    static ref FUNCTION_CALL: Regex =
        Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(([^()]*)\)").unwrap();
    static ref PRATT: PrattParser<Rule> = PrattParser::new()
        .op(Op::infix(Rule::or_op, Assoc::Left))
        .op(Op::infix(Rule::and_op, Assoc::Left))
        .op(Op::infix(Rule::eq_op, Assoc::Left) | Op::infix(Rule::ne_op, Assoc::Left))
        .op(Op::infix(Rule::lt_op, Assoc::Left)
            | Op::infix(Rule::gt_op, Assoc::Left)
            | Op::infix(Rule::le_op, Assoc::Left)
            | Op::infix(Rule::ge_op, Assoc::Left))
        .op(Op::infix(Rule::add_op, Assoc::Left) | Op::infix(Rule::sub_op, Assoc::Left))
        .op(Op::infix(Rule::mul_op, Assoc::Left) | Op::infix(Rule::div_op, Assoc::Left))
        .op(Op::prefix(Rule::not_op) | Op::prefix(Rule::neg_op));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug)]
enum Expr {
    Literal(Value),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

/// Evaluates condition expressions against rows of one schema.
pub struct Evaluator<'a> {
    schema: &'a Schema,
}

impl<'a> Evaluator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Does the row satisfy the expression? Never panics and never
    /// propagates an error; failures are logged and count as `false`.
    pub fn evaluate(&self, expression: &str, row: &[Value]) -> bool {
        match self.try_evaluate(expression, row) {
            Ok(verdict) => verdict,
            Err(e) => {
                debug!(error = %e, expression, "condition failed to evaluate");
                false
            }
        }
    }

    /// The fallible inner form of [`evaluate`](Self::evaluate), useful when
    /// the caller wants to distinguish "false" from "broken".
    pub fn try_evaluate(&self, expression: &str, row: &[Value]) -> Result<bool> {
        let values = self.schema.value_map(row);
        let substituted = substitute_functions(expression, &values)?;
        let substituted = self.substitute_variables(&substituted, row);
        let normalized = normalize_operators(&substituted);
        let ast = parse(&normalized)?;
        Ok(evaluate(&ast)?.truthy())
    }

    fn substitute_variables(&self, text: &str, row: &[Value]) -> String {
        let mut substituted = text.to_string();
        for (variable, matcher) in self.schema.variables().iter().zip(self.schema.matchers()) {
            if !matcher.is_match(&substituted) {
                continue;
            }
            let literal = row
                .get(variable.column_index)
                .unwrap_or(&Value::Missing)
                .to_literal();
            substituted = matcher
                .replace_all(&substituted, NoExpand(&literal))
                .into_owned();
        }
        substituted
    }
}

/// Single flat substitution pass over all recognized function calls,
/// left to right. Call-shaped text inside a string literal is data and is
/// left alone; unknown names in genuine call position are an error.
fn substitute_functions(expression: &str, values: &ValueMap) -> Result<String> {
    let mut output = String::with_capacity(expression.len());
    let mut consumed = 0;
    let mut in_string = false;
    for captures in FUNCTION_CALL.captures_iter(expression) {
        let whole = captures.get(0).unwrap();
        let gap = &expression[consumed..whole.start()];
        in_string ^= gap.matches('"').count() % 2 == 1;
        if in_string {
            output.push_str(gap);
            output.push_str(whole.as_str());
            in_string ^= whole.as_str().matches('"').count() % 2 == 1;
            consumed = whole.end();
            continue;
        }
        let args = split_arguments(&captures[2]);
        let result = functions::call(&captures[1], &args, values)?;
        output.push_str(gap);
        output.push_str(&result.to_literal());
        consumed = whole.end();
    }
    output.push_str(&expression[consumed..]);
    Ok(output)
}

/// Split an argument list on commas, ignoring commas inside quoted strings.
fn split_arguments(raw: &str) -> Vec<&str> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    let mut args = Vec::new();
    let mut in_string = false;
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        match c {
            '"' => in_string = !in_string,
            ',' if !in_string => {
                args.push(raw[start..i].trim());
                start = i + 1;
            }
            _ => (),
        }
    }
    args.push(raw[start..].trim());
    args
}

/// Rewrite the single-character logical operators to their canonical forms,
/// leaving string literals untouched. `&&`, `||` and `!` pass through.
fn normalize_operators(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len() + 8);
    let mut in_string = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            in_string = !in_string;
            normalized.push(c);
            continue;
        }
        if in_string {
            normalized.push(c);
            continue;
        }
        match c {
            '&' => {
                if chars.peek() == Some(&'&') {
                    chars.next();
                }
                normalized.push_str("&&");
            }
            '|' => {
                if chars.peek() == Some(&'|') {
                    chars.next();
                }
                normalized.push_str("||");
            }
            '~' => normalized.push('!'),
            _ => normalized.push(c),
        }
    }
    normalized
}

fn parse(text: &str) -> Result<Expr> {
    let mut pairs = ConditionParser::parse(Rule::condition, text).map_err(|e| {
        EngineError::Parse {
            message: e.to_string(),
        }
    })?;
    match pairs.next() {
        Some(expression) if expression.as_rule() == Rule::expression => {
            build(expression.into_inner())
        }
        _ => Err(EngineError::Parse {
            message: String::from("empty expression"),
        }),
    }
}

fn build(pairs: Pairs<Rule>) -> Result<Expr> {
    PRATT
        .map_primary(|primary: Pair<Rule>| match primary.as_rule() {
            Rule::number => {
                let n = primary.as_str().parse::<f64>().map_err(|e| {
                    EngineError::Parse {
                        message: format!("bad number {}: {e}", primary.as_str()),
                    }
                })?;
                Ok(Expr::Literal(Value::Number(n)))
            }
            Rule::string => {
                let quoted = primary.as_str();
                Ok(Expr::Literal(Value::Text(
                    quoted[1..quoted.len() - 1].to_string(),
                )))
            }
            Rule::boolean => Ok(Expr::Literal(Value::Bool(primary.as_str() == "true"))),
            Rule::null => Ok(Expr::Literal(Value::Missing)),
            Rule::expression => build(primary.into_inner()),
            rule => Err(EngineError::Parse {
                message: format!("unexpected token: {rule:?}"),
            }),
        })
        .map_prefix(|op, operand| {
            let unary = match op.as_rule() {
                Rule::not_op => UnaryOp::Not,
                _ => UnaryOp::Neg,
            };
            Ok(Expr::Unary(unary, Box::new(operand?)))
        })
        .map_infix(|lhs, op, rhs| {
            let binary = match op.as_rule() {
                Rule::or_op => BinaryOp::Or,
                Rule::and_op => BinaryOp::And,
                Rule::eq_op => BinaryOp::Eq,
                Rule::ne_op => BinaryOp::Ne,
                Rule::lt_op => BinaryOp::Lt,
                Rule::gt_op => BinaryOp::Gt,
                Rule::le_op => BinaryOp::Le,
                Rule::ge_op => BinaryOp::Ge,
                Rule::add_op => BinaryOp::Add,
                Rule::sub_op => BinaryOp::Sub,
                Rule::mul_op => BinaryOp::Mul,
                _ => BinaryOp::Div,
            };
            Ok(Expr::Binary(binary, Box::new(lhs?), Box::new(rhs?)))
        })
        .parse(pairs)
}

fn evaluate(expr: &Expr) -> Result<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Unary(op, operand) => {
            let value = evaluate(operand)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
                UnaryOp::Neg => match value.as_number() {
                    Some(n) => Ok(Value::Number(-n)),
                    None => Err(EngineError::TypeMismatch(format!(
                        "cannot negate {value}"
                    ))),
                },
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            // logical operators short-circuit on the left operand
            if *op == BinaryOp::And {
                let left = evaluate(lhs)?;
                if !left.truthy() {
                    return Ok(Value::Bool(false));
                }
                return Ok(Value::Bool(evaluate(rhs)?.truthy()));
            }
            if *op == BinaryOp::Or {
                let left = evaluate(lhs)?;
                if left.truthy() {
                    return Ok(Value::Bool(true));
                }
                return Ok(Value::Bool(evaluate(rhs)?.truthy()));
            }
            let left = evaluate(lhs)?;
            let right = evaluate(rhs)?;
            match op {
                BinaryOp::Eq => Ok(Value::Bool(strict_eq(&left, &right))),
                BinaryOp::Ne => Ok(Value::Bool(!strict_eq(&left, &right))),
                BinaryOp::Lt => compare(&left, &right, |o| o == std::cmp::Ordering::Less),
                BinaryOp::Le => compare(&left, &right, |o| o != std::cmp::Ordering::Greater),
                BinaryOp::Gt => compare(&left, &right, |o| o == std::cmp::Ordering::Greater),
                BinaryOp::Ge => compare(&left, &right, |o| o != std::cmp::Ordering::Less),
                BinaryOp::Add => arithmetic(&left, &right, |a, b| a + b),
                BinaryOp::Sub => arithmetic(&left, &right, |a, b| a - b),
                BinaryOp::Mul => arithmetic(&left, &right, |a, b| a * b),
                BinaryOp::Div => arithmetic(&left, &right, |a, b| a / b),
                BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
            }
        }
    }
}

/// Strict equality: values of different kinds are unequal, never an error.
/// Text comparison is case-sensitive.
fn strict_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Missing, Value::Missing) => true,
        _ => false,
    }
}

fn compare(
    left: &Value,
    right: &Value,
    accept: impl Fn(std::cmp::Ordering) -> bool,
) -> Result<Value> {
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).ok_or_else(|| {
            EngineError::Evaluation(String::from("ordering comparison against NaN"))
        })?,
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        _ => {
            return Err(EngineError::TypeMismatch(format!(
                "cannot order {left} against {right}"
            )))
        }
    };
    Ok(Value::Bool(accept(ordering)))
}

fn arithmetic(left: &Value, right: &Value, apply: impl Fn(f64, f64) -> f64) -> Result<Value> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok(Value::Number(apply(a, b))),
        _ => Err(EngineError::TypeMismatch(format!(
            "arithmetic needs numbers, got {left} and {right}"
        ))),
    }
}
