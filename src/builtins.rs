//! Builtin function allow-list for the convertor language.
//!
//! Single source of truth for every callable name a snippet may reference.
//! This table IS the capability surface: the validator checks call targets
//! and arities against it, and the interpreter dispatches through it.
//! Nothing in here can reach the filesystem, network, clock, environment,
//! or process state.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::EngineError;
use crate::transforms::py_slice;
use crate::value::Value;

// =============================================================================
// TYPES
// =============================================================================

pub type BuiltinFn = fn(&[Value]) -> Result<Value, EngineError>;

/// One allow-listed builtin: fixed name, fixed arity, pure function
#[derive(Clone, Copy)]
pub struct BuiltinDef {
    pub name: &'static str,
    pub arity: usize,
    pub run: BuiltinFn,
}

// =============================================================================
// REGISTRY
// =============================================================================

static BUILTINS: Lazy<HashMap<&'static str, BuiltinDef>> = Lazy::new(build);

/// Look up a builtin by name
pub fn find_builtin(name: &str) -> Option<&'static BuiltinDef> {
    BUILTINS.get(name)
}

/// Check if a builtin exists
pub fn builtin_exists(name: &str) -> bool {
    BUILTINS.contains_key(name)
}

/// All builtin names, sorted (for diagnostics)
pub fn builtin_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = BUILTINS.keys().copied().collect();
    names.sort_unstable();
    names
}

fn build() -> HashMap<&'static str, BuiltinDef> {
    let defs = [
        BuiltinDef {
            name: "len",
            arity: 1,
            run: builtin_len,
        },
        BuiltinDef {
            name: "str",
            arity: 1,
            run: builtin_str,
        },
        BuiltinDef {
            name: "int",
            arity: 1,
            run: builtin_int,
        },
        BuiltinDef {
            name: "abs",
            arity: 1,
            run: builtin_abs,
        },
        BuiltinDef {
            name: "min",
            arity: 2,
            run: builtin_min,
        },
        BuiltinDef {
            name: "max",
            arity: 2,
            run: builtin_max,
        },
        BuiltinDef {
            name: "upper",
            arity: 1,
            run: builtin_upper,
        },
        BuiltinDef {
            name: "lower",
            arity: 1,
            run: builtin_lower,
        },
        BuiltinDef {
            name: "trim",
            arity: 1,
            run: builtin_trim,
        },
        BuiltinDef {
            name: "contains",
            arity: 2,
            run: builtin_contains,
        },
        BuiltinDef {
            name: "starts_with",
            arity: 2,
            run: builtin_starts_with,
        },
        BuiltinDef {
            name: "ends_with",
            arity: 2,
            run: builtin_ends_with,
        },
        BuiltinDef {
            name: "replace",
            arity: 3,
            run: builtin_replace,
        },
        BuiltinDef {
            name: "slice",
            arity: 3,
            run: builtin_slice,
        },
        BuiltinDef {
            name: "has",
            arity: 2,
            run: builtin_has,
        },
        BuiltinDef {
            name: "get",
            arity: 3,
            run: builtin_get,
        },
    ];

    defs.into_iter().map(|def| (def.name, def)).collect()
}

// =============================================================================
// ARGUMENT HELPERS
// =============================================================================

// Arity is enforced before dispatch, so a missing argument here means an
// engine bug, reported as a plain execution error rather than a panic.

fn want_str<'a>(builtin: &str, args: &'a [Value], idx: usize) -> Result<&'a str, EngineError> {
    match args.get(idx) {
        Some(Value::Str(s)) => Ok(s),
        Some(other) => Err(EngineError::Execution(format!(
            "{builtin}: expected a 'str' argument, found '{}'",
            other.type_name()
        ))),
        None => Err(EngineError::Execution(format!(
            "{builtin}: missing argument {idx}"
        ))),
    }
}

fn want_int(builtin: &str, args: &[Value], idx: usize) -> Result<i64, EngineError> {
    match args.get(idx) {
        Some(Value::Int(i)) => Ok(*i),
        Some(other) => Err(EngineError::Execution(format!(
            "{builtin}: expected an 'int' argument, found '{}'",
            other.type_name()
        ))),
        None => Err(EngineError::Execution(format!(
            "{builtin}: missing argument {idx}"
        ))),
    }
}

fn want_map<'a>(
    builtin: &str,
    args: &'a [Value],
    idx: usize,
) -> Result<&'a std::collections::BTreeMap<String, String>, EngineError> {
    match args.get(idx) {
        Some(Value::Map(entries)) => Ok(entries),
        Some(other) => Err(EngineError::Execution(format!(
            "{builtin}: expected a 'map[str, str]' argument, found '{}'",
            other.type_name()
        ))),
        None => Err(EngineError::Execution(format!(
            "{builtin}: missing argument {idx}"
        ))),
    }
}

// =============================================================================
// IMPLEMENTATIONS
// =============================================================================

/// Character count for strings, entry count for maps
fn builtin_len(args: &[Value]) -> Result<Value, EngineError> {
    match args.first() {
        Some(Value::Str(s)) => Ok(Value::Int(s.chars().count() as i64)),
        Some(Value::Map(entries)) => Ok(Value::Int(entries.len() as i64)),
        Some(other) => Err(EngineError::Execution(format!(
            "len: expected a 'str' or 'map[str, str]' argument, found '{}'",
            other.type_name()
        ))),
        None => Err(EngineError::Execution("len: missing argument 0".to_string())),
    }
}

fn builtin_str(args: &[Value]) -> Result<Value, EngineError> {
    match args.first() {
        Some(Value::Str(s)) => Ok(Value::Str(s.clone())),
        Some(Value::Int(i)) => Ok(Value::Str(i.to_string())),
        Some(Value::Bool(b)) => Ok(Value::Str(b.to_string())),
        Some(other) => Err(EngineError::Execution(format!(
            "str: cannot convert a '{}' value",
            other.type_name()
        ))),
        None => Err(EngineError::Execution("str: missing argument 0".to_string())),
    }
}

fn builtin_int(args: &[Value]) -> Result<Value, EngineError> {
    match args.first() {
        Some(Value::Int(i)) => Ok(Value::Int(*i)),
        Some(Value::Str(s)) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            EngineError::Execution(format!("int: cannot parse '{s}' as an integer"))
        }),
        Some(other) => Err(EngineError::Execution(format!(
            "int: cannot convert a '{}' value",
            other.type_name()
        ))),
        None => Err(EngineError::Execution("int: missing argument 0".to_string())),
    }
}

fn builtin_abs(args: &[Value]) -> Result<Value, EngineError> {
    let i = want_int("abs", args, 0)?;
    i.checked_abs()
        .map(Value::Int)
        .ok_or_else(|| EngineError::Execution("abs: integer overflow".to_string()))
}

fn builtin_min(args: &[Value]) -> Result<Value, EngineError> {
    let a = want_int("min", args, 0)?;
    let b = want_int("min", args, 1)?;
    Ok(Value::Int(a.min(b)))
}

fn builtin_max(args: &[Value]) -> Result<Value, EngineError> {
    let a = want_int("max", args, 0)?;
    let b = want_int("max", args, 1)?;
    Ok(Value::Int(a.max(b)))
}

fn builtin_upper(args: &[Value]) -> Result<Value, EngineError> {
    Ok(Value::Str(want_str("upper", args, 0)?.to_uppercase()))
}

fn builtin_lower(args: &[Value]) -> Result<Value, EngineError> {
    Ok(Value::Str(want_str("lower", args, 0)?.to_lowercase()))
}

fn builtin_trim(args: &[Value]) -> Result<Value, EngineError> {
    Ok(Value::Str(want_str("trim", args, 0)?.trim().to_string()))
}

fn builtin_contains(args: &[Value]) -> Result<Value, EngineError> {
    let haystack = want_str("contains", args, 0)?;
    let needle = want_str("contains", args, 1)?;
    Ok(Value::Bool(haystack.contains(needle)))
}

fn builtin_starts_with(args: &[Value]) -> Result<Value, EngineError> {
    let haystack = want_str("starts_with", args, 0)?;
    let prefix = want_str("starts_with", args, 1)?;
    Ok(Value::Bool(haystack.starts_with(prefix)))
}

fn builtin_ends_with(args: &[Value]) -> Result<Value, EngineError> {
    let haystack = want_str("ends_with", args, 0)?;
    let suffix = want_str("ends_with", args, 1)?;
    Ok(Value::Bool(haystack.ends_with(suffix)))
}

fn builtin_replace(args: &[Value]) -> Result<Value, EngineError> {
    let subject = want_str("replace", args, 0)?;
    let from = want_str("replace", args, 1)?;
    let to = want_str("replace", args, 2)?;
    Ok(Value::Str(subject.replace(from, to)))
}

/// Half-open character slice; negatives count from the end, out-of-range
/// indices clamp. Same semantics as the `substr` transform.
fn builtin_slice(args: &[Value]) -> Result<Value, EngineError> {
    let subject = want_str("slice", args, 0)?;
    let start = want_int("slice", args, 1)?;
    let end = want_int("slice", args, 2)?;
    Ok(Value::Str(py_slice(subject, Some(start), Some(end))))
}

fn builtin_has(args: &[Value]) -> Result<Value, EngineError> {
    let entries = want_map("has", args, 0)?;
    let key = want_str("has", args, 1)?;
    Ok(Value::Bool(entries.contains_key(key)))
}

fn builtin_get(args: &[Value]) -> Result<Value, EngineError> {
    let entries = want_map("get", args, 0)?;
    let key = want_str("get", args, 1)?;
    let default = want_str("get", args, 2)?;
    Ok(Value::Str(
        entries.get(key).cloned().unwrap_or_else(|| default.to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn s(v: &str) -> Value {
        Value::Str(v.to_string())
    }

    #[test]
    fn test_registry_lookup() {
        assert!(builtin_exists("upper"));
        assert!(builtin_exists("slice"));
        assert!(!builtin_exists("open"));
        assert!(!builtin_exists("eval"));
        assert_eq!(find_builtin("replace").unwrap().arity, 3);
        assert_eq!(builtin_names().len(), 16);
    }

    #[test]
    fn test_string_builtins() {
        assert_eq!(builtin_upper(&[s("hello")]).unwrap(), s("HELLO"));
        assert_eq!(builtin_lower(&[s("HeLLo")]).unwrap(), s("hello"));
        assert_eq!(builtin_trim(&[s("  x  ")]).unwrap(), s("x"));
        assert_eq!(
            builtin_replace(&[s("a-b-c"), s("-"), s("_")]).unwrap(),
            s("a_b_c")
        );
        assert_eq!(
            builtin_contains(&[s("service_name"), s("name")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            builtin_starts_with(&[s("billing"), s("bill")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            builtin_ends_with(&[s("billing"), s("bill")]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_len_counts_chars_not_bytes() {
        assert_eq!(builtin_len(&[s("héllo")]).unwrap(), Value::Int(5));
        let mut entries = BTreeMap::new();
        entries.insert("a".to_string(), "1".to_string());
        assert_eq!(builtin_len(&[Value::Map(entries)]).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_numeric_builtins() {
        assert_eq!(builtin_abs(&[Value::Int(-4)]).unwrap(), Value::Int(4));
        assert_eq!(
            builtin_min(&[Value::Int(2), Value::Int(7)]).unwrap(),
            Value::Int(2)
        );
        assert_eq!(
            builtin_max(&[Value::Int(2), Value::Int(7)]).unwrap(),
            Value::Int(7)
        );
        assert!(builtin_abs(&[Value::Int(i64::MIN)]).is_err());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(builtin_str(&[Value::Int(12)]).unwrap(), s("12"));
        assert_eq!(builtin_str(&[Value::Bool(true)]).unwrap(), s("true"));
        assert_eq!(builtin_int(&[s(" 42 ")]).unwrap(), Value::Int(42));
        assert!(builtin_int(&[s("4x")]).is_err());
    }

    #[test]
    fn test_slice_matches_substr_semantics() {
        assert_eq!(
            builtin_slice(&[s("abcdef"), Value::Int(1), Value::Int(4)]).unwrap(),
            s("bcd")
        );
        assert_eq!(
            builtin_slice(&[s("abcdef"), Value::Int(-2), Value::Int(99)]).unwrap(),
            s("ef")
        );
    }

    #[test]
    fn test_map_builtins() {
        let mut entries = BTreeMap::new();
        entries.insert("service_name".to_string(), "billing".to_string());
        let map = Value::Map(entries);
        assert_eq!(
            builtin_has(&[map.clone(), s("service_name")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            builtin_get(&[map.clone(), s("missing"), s("fallback")]).unwrap(),
            s("fallback")
        );
        assert_eq!(
            builtin_get(&[map, s("service_name"), s("fallback")]).unwrap(),
            s("billing")
        );
    }

    #[test]
    fn test_type_errors_are_execution_errors() {
        let err = builtin_upper(&[Value::Int(3)]).unwrap_err();
        assert!(matches!(err, EngineError::Execution(_)));
        let err = builtin_has(&[s("not a map"), s("k")]).unwrap_err();
        assert!(matches!(err, EngineError::Execution(_)));
    }
}
