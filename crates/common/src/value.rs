//! Runtime value representation for the IPPcode interpreter.
//!
//! Values are what live in variables and on the data stack.

use std::cmp::Ordering;
use std::fmt;

use crate::kind::Kind;

/// A typed runtime value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// Text. Escape sequences are kept verbatim until output.
    Str(String),
    /// The nil value.
    Nil,
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Int(_) => Kind::Int,
            Value::Bool(_) => Kind::Bool,
            Value::Str(_) => Kind::String,
            Value::Nil => Kind::Nil,
        }
    }

    /// Orders two values of the same non-nil kind.
    ///
    /// Returns `None` when the kinds differ or either side is nil. Booleans
    /// order `false < true`; strings order by code point.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
            Value::Nil => f.write_str("nil"),
        }
    }
}
