//! Static evaluation of declared initializers
//!
//! A member or parameter may carry the initializer expression it was
//! declared with. When that expression is built only from literals and
//! simple operators it is folded to a JSON value, which becomes the
//! schema's `default`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Initializer expression as reported by the static-analysis engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Initializer {
    /// A JSON-representable literal
    Literal { value: Value },
    /// `[a, b, ...]`
    Array { elements: Vec<Initializer> },
    /// `{ key: value, ... }`
    Object { properties: Vec<(String, Initializer)> },
    Unary {
        op: UnaryOp,
        operand: Box<Initializer>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Initializer>,
        right: Box<Initializer>,
    },
    /// Anything else, kept as source text. Never evaluable.
    Expression { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnaryOp {
    Negate,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl Initializer {
    pub fn literal(value: impl Into<Value>) -> Self {
        Initializer::Literal { value: value.into() }
    }

    /// Fold the expression to a JSON value, or `None` if any part of it
    /// is not statically known.
    pub fn evaluate(&self) -> Option<Value> {
        match self {
            Initializer::Literal { value } => Some(value.clone()),
            Initializer::Array { elements } => elements
                .iter()
                .map(Initializer::evaluate)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Initializer::Object { properties } => {
                let mut map = Map::new();
                for (key, value) in properties {
                    map.insert(key.clone(), value.evaluate()?);
                }
                Some(Value::Object(map))
            }
            Initializer::Unary { op, operand } => {
                let value = operand.evaluate()?;
                match op {
                    UnaryOp::Negate => json_number(-value.as_f64()?),
                    UnaryOp::Plus => json_number(value.as_f64()?),
                    UnaryOp::Not => Some(Value::Bool(!truthy(&value))),
                }
            }
            Initializer::Binary { op, left, right } => {
                let (left, right) = (left.evaluate()?, right.evaluate()?);
                match (op, &left, &right) {
                    (BinaryOp::Add, Value::String(a), Value::String(b)) => {
                        Some(Value::String(format!("{a}{b}")))
                    }
                    _ => {
                        let (a, b) = (left.as_f64()?, right.as_f64()?);
                        json_number(match op {
                            BinaryOp::Add => a + b,
                            BinaryOp::Sub => a - b,
                            BinaryOp::Mul => a * b,
                            BinaryOp::Div => a / b,
                        })
                    }
                }
            }
            Initializer::Expression { .. } => None,
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// JSON number for `n`, using the integer form for whole values.
///
/// Non-finite numbers have no JSON form and yield `None`.
pub fn json_number(n: f64) -> Option<Value> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Some(Value::from(n as i64));
    }
    serde_json::Number::from_f64(n).map(Value::Number)
}
