//! Built-in transform registry and invoker.
//!
//! Single source of truth for the declaratively-invokable transforms
//! (`change_case`, `substr`). The registry is immutable: it is built once,
//! process-wide, and no API exists to register, replace, or remove entries.
//! Invocation validates the supplied parameters against the descriptor
//! before the transform body runs: undeclared keys and missing required
//! parameters are invalid-parameter errors, declared-type violations are
//! type errors.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::casing::{self, CaseStyle};
use crate::error::EngineError;
use crate::signature::TypeTag;

// =============================================================================
// ARGUMENT VALUES
// =============================================================================

/// A scalar transform argument. Untagged so YAML/JSON scalars map directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ArgValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgValue::Str(_) => "str",
            ArgValue::Int(_) => "int",
            ArgValue::Bool(_) => "bool",
        }
    }

    /// Whether this value satisfies a declared annotation
    pub fn matches_tag(&self, tag: TypeTag) -> bool {
        match tag {
            TypeTag::Any => true,
            TypeTag::Str => matches!(self, ArgValue::Str(_)),
            TypeTag::Int => matches!(self, ArgValue::Int(_)),
            TypeTag::Bool => matches!(self, ArgValue::Bool(_)),
            TypeTag::StrMap => false,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) => write!(f, "{}", s),
            ArgValue::Int(i) => write!(f, "{}", i),
            ArgValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Str(s.to_string())
    }
}

impl From<i64> for ArgValue {
    fn from(i: i64) -> Self {
        ArgValue::Int(i)
    }
}

// =============================================================================
// DESCRIPTORS
// =============================================================================

/// One declared transform parameter
#[derive(Debug, Clone, Copy)]
pub struct TransformParam {
    pub name: &'static str,
    pub ty: TypeTag,
    pub required: bool,
}

pub type TransformFn = fn(&TransformArgs) -> Result<String, EngineError>;

/// A built-in transform: name, declared parameters, implementation.
/// The first parameter is always the subject string `value`.
pub struct TransformDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [TransformParam],
    pub run: TransformFn,
}

impl TransformDescriptor {
    fn param(&self, key: &str) -> Option<&TransformParam> {
        self.params.iter().find(|p| p.name == key)
    }

    /// Check if the transform declares a given parameter key
    pub fn accepts_param(&self, key: &str) -> bool {
        self.param(key).is_some()
    }

    /// Get required parameter names
    pub fn required_param_names(&self) -> Vec<&'static str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect()
    }
}

/// Validated view over the supplied arguments, handed to transform bodies
pub struct TransformArgs<'a> {
    values: &'a BTreeMap<String, ArgValue>,
}

impl<'a> TransformArgs<'a> {
    pub fn new(values: &'a BTreeMap<String, ArgValue>) -> Self {
        TransformArgs { values }
    }

    pub fn str_param(&self, name: &str) -> Result<&'a str, EngineError> {
        match self.values.get(name) {
            Some(ArgValue::Str(s)) => Ok(s),
            Some(other) => Err(EngineError::TypeMismatch {
                expected: "str".to_string(),
                found: other.type_name().to_string(),
            }),
            None => Err(EngineError::InvalidParameter(format!(
                "Missing required parameter '{name}'"
            ))),
        }
    }

    pub fn opt_int_param(&self, name: &str) -> Result<Option<i64>, EngineError> {
        match self.values.get(name) {
            Some(ArgValue::Int(i)) => Ok(Some(*i)),
            Some(other) => Err(EngineError::TypeMismatch {
                expected: "int".to_string(),
                found: other.type_name().to_string(),
            }),
            None => Ok(None),
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

static TRANSFORMS: Lazy<HashMap<&'static str, TransformDescriptor>> = Lazy::new(build);

/// Look up a transform by name
pub fn find_transform(name: &str) -> Option<&'static TransformDescriptor> {
    TRANSFORMS.get(name)
}

/// Check if a transform exists
pub fn transform_exists(name: &str) -> bool {
    TRANSFORMS.contains_key(name)
}

/// All transform names, sorted (for diagnostics)
pub fn transform_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = TRANSFORMS.keys().copied().collect();
    names.sort_unstable();
    names
}

fn build() -> HashMap<&'static str, TransformDescriptor> {
    let defs = [
        TransformDescriptor {
            name: "change_case",
            description: "Reshape the subject into a named case convention",
            params: &[
                TransformParam {
                    name: "value",
                    ty: TypeTag::Str,
                    required: true,
                },
                TransformParam {
                    name: "caseType",
                    ty: TypeTag::Str,
                    required: true,
                },
            ],
            run: transform_change_case,
        },
        TransformDescriptor {
            name: "substr",
            description: "Half-open character slice with negative-index support",
            params: &[
                TransformParam {
                    name: "value",
                    ty: TypeTag::Str,
                    required: true,
                },
                TransformParam {
                    name: "start",
                    ty: TypeTag::Int,
                    required: false,
                },
                TransformParam {
                    name: "end",
                    ty: TypeTag::Int,
                    required: false,
                },
            ],
            run: transform_substr,
        },
    ];

    defs.into_iter().map(|def| (def.name, def)).collect()
}

// =============================================================================
// INVOCATION
// =============================================================================

/// Invoke a built-in transform by name with named arguments.
pub fn invoke(name: &str, params: &BTreeMap<String, ArgValue>) -> Result<String, EngineError> {
    let descriptor =
        find_transform(name).ok_or_else(|| EngineError::UnknownTransform(name.to_string()))?;
    validate_params(descriptor, params)?;
    debug!(transform = name, "invoking built-in transform");
    (descriptor.run)(&TransformArgs::new(params))
}

/// Check every supplied key against the descriptor, then check that nothing
/// required is missing. Runs before the transform body; a failure here means
/// the body never executes.
fn validate_params(
    descriptor: &TransformDescriptor,
    params: &BTreeMap<String, ArgValue>,
) -> Result<(), EngineError> {
    for (key, value) in params {
        let param = descriptor.param(key).ok_or_else(|| {
            EngineError::InvalidParameter(format!(
                "Parameter '{key}' is not a valid parameter for transform '{}'",
                descriptor.name
            ))
        })?;
        if !value.matches_tag(param.ty) {
            return Err(EngineError::TypeMismatch {
                expected: param.ty.name().to_string(),
                found: value.type_name().to_string(),
            });
        }
    }

    for param in descriptor.params.iter().filter(|p| p.required) {
        if !params.contains_key(param.name) {
            return Err(EngineError::InvalidParameter(format!(
                "Missing required parameter '{}' for transform '{}'",
                param.name, descriptor.name
            )));
        }
    }

    Ok(())
}

// =============================================================================
// TRANSFORM BODIES
// =============================================================================

fn transform_change_case(args: &TransformArgs) -> Result<String, EngineError> {
    let value = args.str_param("value")?;
    let case_type = args.str_param("caseType")?;
    let style = CaseStyle::from_str(case_type).map_err(|token| {
        EngineError::InvalidParameter(format!("change_case unknown caseType: {token}"))
    })?;
    Ok(casing::convert(style, value))
}

fn transform_substr(args: &TransformArgs) -> Result<String, EngineError> {
    let value = args.str_param("value")?;
    let start = args.opt_int_param("start")?;
    let end = args.opt_int_param("end")?;
    Ok(py_slice(value, start, end))
}

/// Half-open character slice: negative indices count from the end,
/// out-of-range indices clamp to the string bounds, and an omitted bound
/// means the corresponding end of the string.
pub(crate) fn py_slice(subject: &str, start: Option<i64>, end: Option<i64>) -> String {
    let chars: Vec<char> = subject.chars().collect();
    let len = chars.len() as i64;

    let resolve = |bound: Option<i64>, default: i64| -> i64 {
        match bound {
            None => default,
            Some(i) if i < 0 => (i + len).max(0),
            Some(i) => i.min(len),
        }
    };

    let start = resolve(start, 0);
    let end = resolve(end, len);
    if start >= end {
        return String::new();
    }
    chars[start as usize..end as usize].iter().collect()
}
