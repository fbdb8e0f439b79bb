use serde::Serialize;

use crate::error::{ParseError, ParseResult};
use declarg_metadata::ValueType;

/// A converted argument value handed to [`Target::set`](crate::Target::set).
///
/// List-typed fields receive one scalar per occurrence; accumulation is up to
/// the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Text(String),
    Integer(i64),
    Float(f64),
    List(Vec<Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Convert a raw token for `flag` into a value of `value_type`.
///
/// A switch without a value means `true`. Every other type requires one.
pub(crate) fn convert(value_type: &ValueType, flag: &str, raw: Option<&str>) -> ParseResult<Value> {
    let invalid = |raw: &str| ParseError::InvalidValue {
        flag: flag.to_string(),
        value: raw.to_string(),
        expected: value_type.to_string(),
    };

    match (value_type, raw) {
        (ValueType::Bool, None) => Ok(Value::Bool(true)),
        (ValueType::Bool, Some(raw)) => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| invalid(raw)),
        (_, None) => Err(ParseError::MissingValue {
            flag: flag.to_string(),
        }),
        (ValueType::Text, Some(raw)) => Ok(Value::Text(raw.to_string())),
        (ValueType::Integer, Some(raw)) => raw
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| invalid(raw)),
        (ValueType::Float, Some(raw)) => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| invalid(raw)),
        (ValueType::List(inner), Some(raw)) => convert(inner, flag, Some(raw)),
    }
}
