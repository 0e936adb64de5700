//! JSON-logic condition interpreter.
//!
//! Catalog conditions are stored as raw JSON trees. `Expr::from_value`
//! resolves the shape once into a tagged AST; evaluating a parsed tree is
//! total. The value semantics mirror the JavaScript rules the stored
//! conditions were written against: an explicit absent sentinel for missing
//! paths, JS truthiness, and JS numeric coercion for comparisons.

use serde_json::Value;
use thiserror::Error;

/// Parse-time failures for condition trees. Evaluation itself cannot fail;
/// anything malformed is rejected here so the matcher can skip the rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("expected a single-operator object, found {0} keys")]
    NotAnOperator(usize),
    #[error("unknown operator: {0}")]
    UnknownOperator(String),
    #[error("{op} expects exactly {expected} operands, found {found}")]
    Arity {
        op: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("var reference must be a string path")]
    VarPath,
    #[error("{0} operands must be an array")]
    OperandList(&'static str),
}

/// A parsed condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal JSON value, returned as-is.
    Literal(Value),
    /// Dot-path lookup into the evaluation context.
    Var(String),
    /// Conjunction: first falsy operand wins, otherwise the last operand.
    And(Vec<Expr>),
    /// Disjunction: first truthy operand wins, otherwise the last operand.
    Or(Vec<Expr>),
    /// Numeric greater-or-equal under JS coercion.
    Gte(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Parses a raw condition tree. Non-object values and arrays are
    /// literals; objects must be single-key operator nodes.
    pub fn from_value(value: &Value) -> Result<Expr, ExprError> {
        let map = match value {
            Value::Object(map) => map,
            other => return Ok(Expr::Literal(other.clone())),
        };

        let (op, payload) = match map.iter().next() {
            Some(entry) if map.len() == 1 => entry,
            _ => return Err(ExprError::NotAnOperator(map.len())),
        };

        match op.as_str() {
            "var" => match payload {
                Value::String(path) => Ok(Expr::Var(path.clone())),
                _ => Err(ExprError::VarPath),
            },
            "and" => Ok(Expr::And(Self::operand_list("and", payload)?)),
            "or" => Ok(Expr::Or(Self::operand_list("or", payload)?)),
            ">=" => {
                let items = payload.as_array().ok_or(ExprError::OperandList(">="))?;
                match items.as_slice() {
                    [left, right] => Ok(Expr::Gte(
                        Box::new(Expr::from_value(left)?),
                        Box::new(Expr::from_value(right)?),
                    )),
                    other => Err(ExprError::Arity {
                        op: ">=",
                        expected: 2,
                        found: other.len(),
                    }),
                }
            }
            other => Err(ExprError::UnknownOperator(other.to_string())),
        }
    }

    fn operand_list(op: &'static str, payload: &Value) -> Result<Vec<Expr>, ExprError> {
        let items = payload.as_array().ok_or(ExprError::OperandList(op))?;
        items.iter().map(Expr::from_value).collect()
    }

    /// Evaluates against a context value. `None` is the absent sentinel: a
    /// var path that resolved nowhere. Absent is falsy and compares as NaN.
    pub fn evaluate(&self, context: &Value) -> Option<Value> {
        match self {
            Expr::Literal(value) => Some(value.clone()),
            Expr::Var(path) => resolve_path(context, path),
            Expr::And(operands) => {
                let mut last = None;
                for operand in operands {
                    let value = operand.evaluate(context);
                    if !truthy(value.as_ref()) {
                        return value;
                    }
                    last = value;
                }
                last
            }
            Expr::Or(operands) => {
                let mut last = None;
                for operand in operands {
                    let value = operand.evaluate(context);
                    if truthy(value.as_ref()) {
                        return value;
                    }
                    last = value;
                }
                last
            }
            Expr::Gte(left, right) => {
                let left = to_number(left.evaluate(context).as_ref());
                let right = to_number(right.evaluate(context).as_ref());
                // NaN on either side makes the comparison false, so a
                // missing field never satisfies a threshold.
                Some(Value::Bool(left >= right))
            }
        }
    }
}

/// Walks a dot-separated path through nested objects. A trailing `length`
/// segment on an array yields the array length, matching the JavaScript
/// property the stored conditions rely on. An empty path addresses the
/// whole context.
fn resolve_path(context: &Value, path: &str) -> Option<Value> {
    if path.is_empty() {
        return Some(context.clone());
    }

    let mut current = context;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        match current {
            Value::Object(map) => match map.get(segment) {
                Some(next) => current = next,
                None => return None,
            },
            Value::Array(items) if segment == "length" && segments.peek().is_none() => {
                return Some(Value::from(items.len()));
            }
            _ => return None,
        }
    }
    Some(current.clone())
}

/// JavaScript truthiness over an optional value; absent is falsy.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// JavaScript `Number()` coercion. Anything non-coercible is NaN, and NaN
/// never satisfies a comparison.
fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(flag)) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(number)) => number.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Some(Value::Array(items)) => match items.len() {
            0 => 0.0,
            1 => to_number(Some(&items[0])),
            _ => f64::NAN,
        },
        Some(Value::Object(_)) => f64::NAN,
    }
}
