//! Runtime values for the convertor interpreter.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::ast::Literal;
use crate::signature::TypeTag;

/// Stack-struct overhead charged per string by the memory meter
const STR_OVERHEAD: usize = 24;
/// Per-entry overhead charged for map storage by the memory meter
const MAP_ENTRY_OVERHEAD: usize = 64;

/// A runtime value. The only map shape in the language is string-to-string,
/// so `Map` stores exactly that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    Map(BTreeMap<String, String>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "str",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Map(_) => "map[str, str]",
        }
    }

    /// Whether this value satisfies a declared annotation
    pub fn matches_tag(&self, tag: TypeTag) -> bool {
        match tag {
            TypeTag::Any => true,
            TypeTag::Str => matches!(self, Value::Str(_)),
            TypeTag::Int => matches!(self, Value::Int(_)),
            TypeTag::Bool => matches!(self, Value::Bool(_)),
            TypeTag::StrMap => matches!(self, Value::Map(_)),
        }
    }

    /// Rough live size in bytes, used by the interpreter's memory meter.
    /// An estimate of interpreter-visible storage, not allocator truth.
    pub fn approx_bytes(&self) -> usize {
        match self {
            Value::Str(s) => STR_OVERHEAD + s.len(),
            Value::Int(_) | Value::Bool(_) => 8,
            Value::Map(entries) => entries
                .iter()
                .map(|(k, v)| MAP_ENTRY_OVERHEAD + k.len() + v.len())
                .sum::<usize>(),
        }
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Str(s) => Value::Str(s.clone()),
            Literal::Int(i) => Value::Int(*i),
            Literal::Bool(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\": \"{}\"", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}
