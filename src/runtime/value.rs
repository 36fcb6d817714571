//! Runtime values

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::frontend::semantic::Type;

/// A value produced by evaluating a line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Int(i64),
    Double(f64),
    String(Arc<str>),
    Bool(bool),
    Void,
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    /// Static type of this value
    pub fn ty(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Double(_) => Type::Double,
            Value::String(_) => Type::String,
            Value::Bool(_) => Type::Bool,
            Value::Void => Type::Void,
        }
    }

    /// Default value for a declared type without initializer
    pub fn default_for(ty: Type) -> Value {
        match ty {
            Type::Int => Value::Int(0),
            Type::Double => Value::Double(0.0),
            Type::String => Value::string(""),
            Type::Bool => Value::Bool(false),
            Type::Void | Type::Object | Type::Error => Value::Void,
        }
    }

    /// Apply the implicit int to double conversion when `target` asks for it
    pub fn coerce(
        self,
        target: Type,
    ) -> Value {
        match (self, target) {
            (Value::Int(n), Type::Double) => Value::Double(n as f64),
            (value, _) => value,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Source-like rendering used for line results: strings are quoted
    pub fn display_result(&self) -> String {
        match self {
            Value::String(s) => format!("{:?}", s.as_ref()),
            other => other.to_string(),
        }
    }
}

/// Text conversion (`ToString()`, string concatenation, `Console.WriteLine`)
impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Double(d) => format_double(*d, f),
            Value::String(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Void => Ok(()),
        }
    }
}

fn format_double(
    d: f64,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    if d.is_nan() {
        f.write_str("NaN")
    } else if d.is_infinite() {
        f.write_str(if d > 0.0 { "∞" } else { "-∞" })
    } else {
        write!(f, "{}", d)
    }
}
