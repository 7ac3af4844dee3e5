//! Error types for the convertor engine.
//!
//! One closed taxonomy covers the whole engine surface: snippet validation,
//! bounded execution, and built-in transform invocation. Every failure is
//! surfaced synchronously to the caller as one of these kinds; the engine
//! never retries, degrades, or caches across calls.

use thiserror::Error;

use crate::signature::SignatureSpec;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The snippet is not well-formed in the convertor language.
    #[error("Syntax error in convertor snippet: {0}")]
    Syntax(String),

    /// The snippet parsed but contains no function definition.
    #[error("No function definition found in the provided code.")]
    DefinitionNotFound,

    /// The definition references names outside its own parameters, locals,
    /// and the builtin allow-list, or misuses a builtin.
    #[error("Compilation failed: {0}")]
    Compilation(String),

    /// The definition's shape differs from the expected signature. Both
    /// descriptors ride along so callers can show the full disagreement.
    #[error("Function signature mismatch. Expected: {expected}, Found: {actual}")]
    SignatureMismatch {
        expected: SignatureSpec,
        actual: SignatureSpec,
    },

    /// Lookup of a built-in transform by name failed.
    #[error("Unknown transform: '{0}'")]
    UnknownTransform(String),

    /// A transform was invoked with a parameter it does not declare, with a
    /// required parameter missing, or with an unusable parameter value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A supplied value's runtime type contradicts a declared parameter type.
    #[error("Type error: Expected a '{expected}' value, but found a '{found}' value.")]
    TypeMismatch { expected: String, found: String },

    /// The wall-clock limit elapsed, or the step budget ran out.
    #[error("Execution timed out: {0}")]
    Timeout(String),

    /// The execution's metered allocations crossed the memory ceiling.
    #[error("Memory ceiling of {limit} bytes exceeded")]
    MemoryLimit { limit: usize },

    /// The snippet body itself failed while running.
    #[error("Execution failed: {0}")]
    Execution(String),
}

impl EngineError {
    /// Stable lowercase tag for logging and coarse matching.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Syntax(_) => "syntax",
            EngineError::DefinitionNotFound => "definition_not_found",
            EngineError::Compilation(_) => "compilation",
            EngineError::SignatureMismatch { .. } => "signature_mismatch",
            EngineError::UnknownTransform(_) => "unknown_transform",
            EngineError::InvalidParameter(_) => "invalid_parameter",
            EngineError::TypeMismatch { .. } => "type_mismatch",
            EngineError::Timeout(_) => "timeout",
            EngineError::MemoryLimit { .. } => "memory_limit",
            EngineError::Execution(_) => "execution",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::convertor_signature;

    #[test]
    fn test_display_messages() {
        let err = EngineError::TypeMismatch {
            expected: "str".to_string(),
            found: "int".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Type error: Expected a 'str' value, but found a 'int' value."
        );

        let err = EngineError::UnknownTransform("reverse".to_string());
        assert_eq!(err.to_string(), "Unknown transform: 'reverse'");

        let err = EngineError::MemoryLimit { limit: 1024 };
        assert_eq!(err.to_string(), "Memory ceiling of 1024 bytes exceeded");
    }

    #[test]
    fn test_signature_mismatch_carries_both_descriptors() {
        let expected = convertor_signature();
        let actual = SignatureSpec::new(vec![], crate::signature::TypeTag::Str);
        let err = EngineError::SignatureMismatch {
            expected: expected.clone(),
            actual: actual.clone(),
        };
        match err {
            EngineError::SignatureMismatch {
                expected: e,
                actual: a,
            } => {
                assert_eq!(e, expected);
                assert_eq!(a, actual);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(EngineError::DefinitionNotFound.kind(), "definition_not_found");
        assert_eq!(
            EngineError::Timeout("wall clock limit of 5s exceeded".to_string()).kind(),
            "timeout"
        );
    }
}
