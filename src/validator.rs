//! Call signature validator for convertor snippets.
//!
//! Validation runs in fixed stages, each gated on the previous one:
//!
//! 1. **Parse** the snippet (`Syntax` on failure)
//! 2. **Extract** the first function definition (`DefinitionNotFound` when
//!    there is none; later definitions are ignored)
//! 3. **Resolve capabilities** over the chosen definition: every referenced
//!    name must be a parameter, an in-scope `let`, or an allow-listed
//!    builtin with the right arity (`Compilation` on any violation)
//! 4. **Compare signatures** structurally against the expected descriptor
//!    (`SignatureMismatch` carrying both shapes)
//!
//! No stage executes snippet code. A definition that survives all four
//! stages comes out as a [`ValidatedCallable`], the only door into the
//! executor.

use std::collections::HashSet;
use tracing::debug;

use crate::ast::{Expr, FunctionDef, Stmt};
use crate::builtins::find_builtin;
use crate::error::EngineError;
use crate::parser::parse_snippet;
use crate::signature::SignatureSpec;

// =============================================================================
// VALIDATED CALLABLE
// =============================================================================

/// A definition that passed validation against an expected signature.
///
/// Deliberately not `Clone`: a callable is consumed by the execution that
/// uses it, so reuse across calls is unrepresentable.
#[derive(Debug)]
pub struct ValidatedCallable {
    def: FunctionDef,
    signature: SignatureSpec,
}

impl ValidatedCallable {
    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn signature(&self) -> &SignatureSpec {
        &self.signature
    }

    pub(crate) fn into_def(self) -> FunctionDef {
        self.def
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Validate `source` against an expected signature descriptor.
pub fn validate(
    source: &str,
    expected: &SignatureSpec,
) -> Result<ValidatedCallable, EngineError> {
    let snippet = parse_snippet(source)?;

    let total = snippet.function_count();
    let def = snippet
        .first_function()
        .cloned()
        .ok_or(EngineError::DefinitionNotFound)?;
    if total > 1 {
        debug!(
            count = total,
            chosen = %def.name,
            "multiple function definitions in snippet; using the first"
        );
    }

    resolve_capabilities(&def)?;

    let actual = def.signature();
    if actual != *expected {
        return Err(EngineError::SignatureMismatch {
            expected: expected.clone(),
            actual,
        });
    }

    Ok(ValidatedCallable {
        def,
        signature: actual,
    })
}

// =============================================================================
// CAPABILITY RESOLUTION
// =============================================================================

/// Walk the chosen definition and reject any name outside its own
/// parameters, in-scope `let` bindings, and the builtin allow-list.
/// Read-only: no snippet code runs.
fn resolve_capabilities(def: &FunctionDef) -> Result<(), EngineError> {
    let mut params = HashSet::new();
    for param in &def.params {
        if !params.insert(param.name.clone()) {
            return Err(EngineError::Compilation(format!(
                "Duplicate parameter name: '{}'",
                param.name
            )));
        }
    }

    let mut resolver = Resolver {
        scopes: vec![params],
    };
    resolver.block(&def.body)
}

struct Resolver {
    /// Innermost scope last; index 0 holds the parameters
    scopes: Vec<HashSet<String>>,
}

impl Resolver {
    fn block(&mut self, stmts: &[Stmt]) -> Result<(), EngineError> {
        self.scopes.push(HashSet::new());
        let result = stmts.iter().try_for_each(|stmt| self.stmt(stmt));
        self.scopes.pop();
        result
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<(), EngineError> {
        match stmt {
            Stmt::Let { name, value, .. } => {
                // The initializer sees only prior bindings
                self.expr(value)?;
                self.declare(name);
                Ok(())
            }
            Stmt::Assign { name, value, .. } => {
                if !self.resolved(name) {
                    return Err(EngineError::Compilation(format!(
                        "Cannot assign to undeclared name: '{name}'"
                    )));
                }
                self.expr(value)
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
                ..
            } => {
                self.expr(cond)?;
                self.block(then_body)?;
                if let Some(else_body) = else_body {
                    self.block(else_body)?;
                }
                Ok(())
            }
            Stmt::While { cond, body, .. } => {
                self.expr(cond)?;
                self.block(body)
            }
            Stmt::Return { value, .. } => self.expr(value),
        }
    }

    fn expr(&mut self, expr: &Expr) -> Result<(), EngineError> {
        match expr {
            Expr::Literal { .. } => Ok(()),
            Expr::Var { name, .. } => {
                if self.resolved(name) {
                    Ok(())
                } else {
                    Err(EngineError::Compilation(format!(
                        "Unresolved name: '{name}'"
                    )))
                }
            }
            Expr::Unary { operand, .. } => self.expr(operand),
            Expr::Binary { lhs, rhs, .. } => {
                self.expr(lhs)?;
                self.expr(rhs)
            }
            Expr::Index { base, index, .. } => {
                self.expr(base)?;
                self.expr(index)
            }
            Expr::Call { name, args, .. } => {
                let builtin = find_builtin(name).ok_or_else(|| {
                    EngineError::Compilation(format!("Unknown function: '{name}'"))
                })?;
                if args.len() != builtin.arity {
                    return Err(EngineError::Compilation(format!(
                        "Builtin '{}' expects {} arguments, found {}",
                        name,
                        builtin.arity,
                        args.len()
                    )));
                }
                args.iter().try_for_each(|arg| self.expr(arg))
            }
        }
    }

    fn resolved(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|scope| scope.contains(name))
    }

    fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }
}
