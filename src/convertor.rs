//! The dynamic convertor pipeline.
//!
//! Composes validation and sandboxed execution into the one call template
//! authors actually use: hand over a snippet and the parameter map, get
//! back the derived value. An empty string result is normalized to `None`
//! so callers treat "the convertor declined" as absence rather than as a
//! usable value.

use std::collections::BTreeMap;
use tracing::debug;

use crate::error::EngineError;
use crate::executor::SandboxExecutor;
use crate::signature::{convertor_signature, SignatureSpec};
use crate::validator::validate;
use crate::value::Value;

/// Validates and runs convertor snippets against the fixed convertor
/// signature `(params: map[str, str]) -> str`.
///
/// The convertor holds no per-call state; one instance can serve any
/// number of calls, concurrently.
#[derive(Debug, Clone)]
pub struct DynamicConvertor {
    executor: SandboxExecutor,
    expected: SignatureSpec,
}

impl Default for DynamicConvertor {
    fn default() -> Self {
        DynamicConvertor::new()
    }
}

impl DynamicConvertor {
    pub fn new() -> Self {
        DynamicConvertor::with_executor(SandboxExecutor::new())
    }

    /// Use a caller-configured executor, e.g. with tighter limits.
    pub fn with_executor(executor: SandboxExecutor) -> Self {
        DynamicConvertor {
            executor,
            expected: convertor_signature(),
        }
    }

    /// Validate `snippet`, run its first function over `params`, and
    /// normalize an empty result to `None`. Every validation and execution
    /// error propagates untranslated.
    pub fn run(
        &self,
        snippet: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Option<String>, EngineError> {
        let callable = validate(snippet, &self.expected)?;
        debug!(
            callable = callable.name(),
            params = params.len(),
            "running convertor snippet"
        );
        let produced = self
            .executor
            .execute(callable, vec![Value::Map(params.clone())])?;
        if produced.is_empty() {
            Ok(None)
        } else {
            Ok(Some(produced))
        }
    }
}
