//! Bounded tree-walking interpreter for validated convertor functions.
//!
//! Three budgets ride along with every run:
//!
//! - a **step budget**: each statement and expression node costs one step,
//!   so every run terminates even when abandoned by its orchestrator
//! - a **memory meter**: live environment bytes plus the current
//!   statement's transient allocations, charged against the configured
//!   ceiling (an estimate of interpreter-visible values, best-effort by
//!   contract)
//! - an optional **deadline**: checked coarsely so a worker whose
//!   orchestrator already gave up on it stops soon after, not only when
//!   the step budget runs dry
//!
//! The interpreter runs on the calling thread; isolation and the blocking
//! wall-clock wait live in the executor.

use std::collections::HashMap;
use std::mem::discriminant;
use std::time::Instant;
use tracing::debug;

use crate::ast::{BinaryOp, Expr, FunctionDef, Stmt, UnaryOp};
use crate::builtins::find_builtin;
use crate::error::EngineError;
use crate::executor::ExecLimits;
use crate::value::Value;

/// How many steps pass between deadline probes
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Run a function with positional arguments under the given limits.
///
/// Missing trailing arguments fall back to declared defaults; a parameter
/// with neither is an execution error, as is an oversupplied call.
pub fn run_function(
    def: &FunctionDef,
    args: Vec<Value>,
    limits: &ExecLimits,
    deadline: Option<Instant>,
) -> Result<Value, EngineError> {
    let mut interp = Interpreter {
        step_budget: limits.step_budget,
        steps_used: 0,
        memory_limit: limits.memory_limit,
        env_bytes: 0,
        stmt_bytes: 0,
        deadline,
        scopes: vec![HashMap::new()],
    };
    interp.run(def, args)
}

struct Interpreter {
    step_budget: u64,
    steps_used: u64,
    memory_limit: usize,
    /// Estimated bytes held by live bindings
    env_bytes: usize,
    /// Transient bytes allocated while evaluating the current statement
    stmt_bytes: usize,
    deadline: Option<Instant>,
    /// Innermost scope last; index 0 holds the arguments
    scopes: Vec<HashMap<String, Value>>,
}

/// Statement outcome: fall through or unwind with the returned value
enum Flow {
    Normal,
    Return(Value),
}

impl Interpreter {
    fn run(&mut self, def: &FunctionDef, args: Vec<Value>) -> Result<Value, EngineError> {
        if args.len() > def.params.len() {
            return Err(EngineError::Execution(format!(
                "Function '{}' takes {} arguments, found {}",
                def.name,
                def.params.len(),
                args.len()
            )));
        }

        let mut supplied = args.into_iter();
        for param in &def.params {
            let value = match supplied.next() {
                Some(value) => value,
                None => match &param.default {
                    Some(lit) => Value::from(lit),
                    None => {
                        return Err(EngineError::Execution(format!(
                            "Missing argument for parameter '{}'",
                            param.name
                        )))
                    }
                },
            };
            self.bind(&param.name, value)?;
        }

        match self.exec_block(&def.body)? {
            Flow::Return(value) => {
                if !value.matches_tag(def.return_ty) {
                    return Err(EngineError::Execution(format!(
                        "Function '{}' is declared to return '{}' but produced a '{}' value",
                        def.name,
                        def.return_ty,
                        value.type_name()
                    )));
                }
                debug!(steps = self.steps_used, "function completed");
                Ok(value)
            }
            Flow::Normal => Err(EngineError::Execution(format!(
                "Function '{}' ended without returning a value",
                def.name
            ))),
        }
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<Flow, EngineError> {
        self.scopes.push(HashMap::new());
        let result = self.exec_stmts(stmts);
        if let Some(scope) = self.scopes.pop() {
            for value in scope.values() {
                self.env_bytes = self.env_bytes.saturating_sub(value.approx_bytes());
            }
        }
        result
    }

    fn exec_stmts(&mut self, stmts: &[Stmt]) -> Result<Flow, EngineError> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec_stmt(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, EngineError> {
        self.step()?;
        self.stmt_bytes = 0;

        match stmt {
            Stmt::Let { name, value, .. } => {
                let value = self.eval(value)?;
                self.bind(name, value)?;
                Ok(Flow::Normal)
            }
            Stmt::Assign { name, value, .. } => {
                let value = self.eval(value)?;
                self.rebind(name, value)?;
                Ok(Flow::Normal)
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
                ..
            } => {
                if self.eval_condition(cond)? {
                    self.exec_block(then_body)
                } else if let Some(else_body) = else_body {
                    self.exec_block(else_body)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { cond, body, .. } => {
                loop {
                    self.step()?;
                    self.stmt_bytes = 0;
                    if !self.eval_condition(cond)? {
                        break;
                    }
                    if let Flow::Return(value) = self.exec_block(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = self.eval(value)?;
                Ok(Flow::Return(value))
            }
        }
    }

    fn eval_condition(&mut self, cond: &Expr) -> Result<bool, EngineError> {
        match self.eval(cond)? {
            Value::Bool(b) => Ok(b),
            other => Err(EngineError::Execution(format!(
                "Condition must be a 'bool', found '{}'",
                other.type_name()
            ))),
        }
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    fn eval(&mut self, expr: &Expr) -> Result<Value, EngineError> {
        self.step()?;

        let value = match expr {
            Expr::Literal { value, .. } => Value::from(value),
            Expr::Var { name, .. } => self.lookup(name)?,
            Expr::Unary { op, operand, .. } => {
                let operand = self.eval(operand)?;
                self.eval_unary(*op, operand)?
            }
            Expr::Binary { op, lhs, rhs, .. } => self.eval_binary(*op, lhs, rhs)?,
            Expr::Index { base, index, .. } => {
                let base = self.eval(base)?;
                let index = self.eval(index)?;
                self.eval_index(base, index)?
            }
            Expr::Call { name, args, .. } => {
                let builtin = find_builtin(name).ok_or_else(|| {
                    // Unreachable past validation; kept as a typed error
                    EngineError::Execution(format!("Unknown function: '{name}'"))
                })?;
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(self.eval(arg)?);
                }
                (builtin.run)(&evaluated)?
            }
        };

        self.charge_transient(value.approx_bytes())?;
        Ok(value)
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: Value) -> Result<Value, EngineError> {
        match (op, operand) {
            (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            (UnaryOp::Neg, Value::Int(i)) => i.checked_neg().map(Value::Int).ok_or_else(|| {
                EngineError::Execution("Integer overflow in unary '-'".to_string())
            }),
            (op, operand) => Err(EngineError::Execution(format!(
                "Operator '{op}' is not defined for '{}'",
                operand.type_name()
            ))),
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Value, EngineError> {
        // && and || short-circuit; everything else evaluates both sides
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            let lhs = self.eval_bool_operand(op, lhs)?;
            return match (op, lhs) {
                (BinaryOp::And, false) => Ok(Value::Bool(false)),
                (BinaryOp::Or, true) => Ok(Value::Bool(true)),
                _ => Ok(Value::Bool(self.eval_bool_operand(op, rhs)?)),
            };
        }

        let lhs = self.eval(lhs)?;
        let rhs = self.eval(rhs)?;

        match op {
            BinaryOp::Add => match (lhs, rhs) {
                (Value::Int(a), Value::Int(b)) => checked_arith(a.checked_add(b), "+"),
                (Value::Str(a), Value::Str(b)) => {
                    let mut out = String::with_capacity(a.len() + b.len());
                    out.push_str(&a);
                    out.push_str(&b);
                    Ok(Value::Str(out))
                }
                (lhs, rhs) => Err(binary_type_error(op, &lhs, &rhs)),
            },
            BinaryOp::Sub => int_arith(op, lhs, rhs, |a, b| a.checked_sub(b)),
            BinaryOp::Mul => int_arith(op, lhs, rhs, |a, b| a.checked_mul(b)),
            BinaryOp::Div => match (lhs, rhs) {
                (Value::Int(_), Value::Int(0)) => {
                    Err(EngineError::Execution("Division by zero".to_string()))
                }
                (Value::Int(a), Value::Int(b)) => checked_arith(a.checked_div(b), "/"),
                (lhs, rhs) => Err(binary_type_error(op, &lhs, &rhs)),
            },
            BinaryOp::Mod => match (lhs, rhs) {
                (Value::Int(_), Value::Int(0)) => {
                    Err(EngineError::Execution("Modulo by zero".to_string()))
                }
                (Value::Int(a), Value::Int(b)) => checked_arith(a.checked_rem(b), "%"),
                (lhs, rhs) => Err(binary_type_error(op, &lhs, &rhs)),
            },
            BinaryOp::Eq | BinaryOp::Ne => {
                if discriminant(&lhs) != discriminant(&rhs) {
                    return Err(binary_type_error(op, &lhs, &rhs));
                }
                let equal = lhs == rhs;
                Ok(Value::Bool(if op == BinaryOp::Eq { equal } else { !equal }))
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let ordering = match (&lhs, &rhs) {
                    (Value::Int(a), Value::Int(b)) => a.cmp(b),
                    (Value::Str(a), Value::Str(b)) => a.cmp(b),
                    _ => return Err(binary_type_error(op, &lhs, &rhs)),
                };
                let outcome = match op {
                    BinaryOp::Lt => ordering.is_lt(),
                    BinaryOp::Le => ordering.is_le(),
                    BinaryOp::Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                };
                Ok(Value::Bool(outcome))
            }
            BinaryOp::And | BinaryOp::Or => {
                // Handled above
                Err(binary_type_error(op, &lhs, &rhs))
            }
        }
    }

    fn eval_bool_operand(&mut self, op: BinaryOp, expr: &Expr) -> Result<bool, EngineError> {
        match self.eval(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(EngineError::Execution(format!(
                "Operator '{op}' requires 'bool' operands, found '{}'",
                other.type_name()
            ))),
        }
    }

    /// Guarded subscript: a miss is an error, never a silent default
    fn eval_index(&mut self, base: Value, index: Value) -> Result<Value, EngineError> {
        match (base, index) {
            (Value::Map(entries), Value::Str(key)) => match entries.get(&key) {
                Some(value) => Ok(Value::Str(value.clone())),
                None => Err(EngineError::Execution(format!(
                    "Key '{key}' not present in map"
                ))),
            },
            (Value::Str(s), Value::Int(i)) => {
                let chars: Vec<char> = s.chars().collect();
                let len = chars.len() as i64;
                let resolved = if i < 0 { i + len } else { i };
                if resolved < 0 || resolved >= len {
                    return Err(EngineError::Execution(format!(
                        "String index {i} out of range for length {len}"
                    )));
                }
                Ok(Value::Str(chars[resolved as usize].to_string()))
            }
            (base, index) => Err(EngineError::Execution(format!(
                "Cannot index a '{}' with a '{}'",
                base.type_name(),
                index.type_name()
            ))),
        }
    }

    // =========================================================================
    // ENVIRONMENT
    // =========================================================================

    fn lookup(&mut self, name: &str) -> Result<Value, EngineError> {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.get(name) {
                return Ok(value.clone());
            }
        }
        // Unreachable past validation; kept as a typed error
        Err(EngineError::Execution(format!("Unresolved name: '{name}'")))
    }

    /// Declare in the innermost scope (a redeclaration replaces)
    fn bind(&mut self, name: &str, value: Value) -> Result<(), EngineError> {
        let added = value.approx_bytes();
        let mut removed = 0;
        if let Some(scope) = self.scopes.last_mut() {
            if let Some(old) = scope.insert(name.to_string(), value) {
                removed = old.approx_bytes();
            }
        }
        self.env_bytes = self.env_bytes.saturating_sub(removed) + added;
        self.check_memory()
    }

    /// Overwrite an existing binding, innermost scope first
    fn rebind(&mut self, name: &str, value: Value) -> Result<(), EngineError> {
        let added = value.approx_bytes();
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                let removed = slot.approx_bytes();
                *slot = value;
                self.env_bytes = self.env_bytes.saturating_sub(removed) + added;
                return self.check_memory();
            }
        }
        // Unreachable past validation; kept as a typed error
        Err(EngineError::Execution(format!(
            "Cannot assign to undeclared name: '{name}'"
        )))
    }

    // =========================================================================
    // BUDGETS
    // =========================================================================

    fn step(&mut self) -> Result<(), EngineError> {
        self.steps_used += 1;
        if self.steps_used > self.step_budget {
            debug!(budget = self.step_budget, "step budget exhausted");
            return Err(EngineError::Timeout(format!(
                "step budget of {} exhausted",
                self.step_budget
            )));
        }
        if self.steps_used % DEADLINE_CHECK_INTERVAL == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    debug!(steps = self.steps_used, "deadline passed mid-run");
                    return Err(EngineError::Timeout(
                        "wall clock limit exceeded".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    fn charge_transient(&mut self, bytes: usize) -> Result<(), EngineError> {
        self.stmt_bytes += bytes;
        self.check_memory()
    }

    fn check_memory(&self) -> Result<(), EngineError> {
        if self.env_bytes + self.stmt_bytes > self.memory_limit {
            debug!(
                env_bytes = self.env_bytes,
                stmt_bytes = self.stmt_bytes,
                limit = self.memory_limit,
                "memory ceiling crossed"
            );
            return Err(EngineError::MemoryLimit {
                limit: self.memory_limit,
            });
        }
        Ok(())
    }
}

fn int_arith(
    op: BinaryOp,
    lhs: Value,
    rhs: Value,
    apply: fn(i64, i64) -> Option<i64>,
) -> Result<Value, EngineError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => checked_arith(apply(a, b), op.symbol()),
        (lhs, rhs) => Err(binary_type_error(op, &lhs, &rhs)),
    }
}

fn checked_arith(result: Option<i64>, symbol: &str) -> Result<Value, EngineError> {
    result.map(Value::Int).ok_or_else(|| {
        EngineError::Execution(format!("Integer overflow in '{symbol}'"))
    })
}

fn binary_type_error(op: BinaryOp, lhs: &Value, rhs: &Value) -> EngineError {
    EngineError::Execution(format!(
        "Operator '{op}' is not defined for '{}' and '{}'",
        lhs.type_name(),
        rhs.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_snippet;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn run_source(source: &str, args: Vec<Value>) -> Result<Value, EngineError> {
        run_source_with(source, args, &ExecLimits::default(), None)
    }

    fn run_source_with(
        source: &str,
        args: Vec<Value>,
        limits: &ExecLimits,
        deadline: Option<Instant>,
    ) -> Result<Value, EngineError> {
        let snippet = parse_snippet(source).unwrap();
        let def = snippet.first_function().unwrap();
        run_function(def, args, limits, deadline)
    }

    fn params_map(pairs: &[(&str, &str)]) -> Value {
        Value::Map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn test_arithmetic_and_precedence() {
        let result = run_source("fn f() -> int { return 1 + 2 * 3 - 4; }", vec![]);
        assert_eq!(result.unwrap(), Value::Int(3));
        let result = run_source("fn f() -> int { return (10 - 4) / 3 % 2; }", vec![]);
        assert_eq!(result.unwrap(), Value::Int(0));
    }

    #[test]
    fn test_string_concat_and_compare() {
        let result = run_source(r#"fn f() -> str { return "a" + "b" + "c"; }"#, vec![]);
        assert_eq!(result.unwrap(), Value::Str("abc".to_string()));
        let result = run_source(r#"fn f() -> bool { return "apple" < "banana"; }"#, vec![]);
        assert_eq!(result.unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_division_by_zero() {
        let err = run_source("fn f() -> int { return 1 / 0; }", vec![]).unwrap_err();
        assert_eq!(err, EngineError::Execution("Division by zero".to_string()));
        let err = run_source("fn f() -> int { return 1 % 0; }", vec![]).unwrap_err();
        assert_eq!(err, EngineError::Execution("Modulo by zero".to_string()));
    }

    #[test]
    fn test_integer_overflow_is_checked() {
        let source = r#"
            fn f() -> int {
                let big = 9223372036854775807;
                return big + 1;
            }
        "#;
        let err = run_source(source, vec![]).unwrap_err();
        assert!(matches!(err, EngineError::Execution(msg) if msg.contains("overflow")));
    }

    #[test]
    fn test_mixed_type_arithmetic_rejected() {
        let err = run_source(r#"fn f() -> str { return "a" + 1; }"#, vec![]).unwrap_err();
        assert!(matches!(err, EngineError::Execution(msg) if msg.contains("'+'")));
    }

    #[test]
    fn test_equality_requires_same_type() {
        let result = run_source(r#"fn f() -> bool { return 2 == 2; }"#, vec![]);
        assert_eq!(result.unwrap(), Value::Bool(true));
        let err = run_source(r#"fn f() -> bool { return 2 == "2"; }"#, vec![]).unwrap_err();
        assert!(matches!(err, EngineError::Execution(_)));
    }

    #[test]
    fn test_logic_short_circuits() {
        let result = run_source("fn f() -> bool { return false && 1 / 0 == 0; }", vec![]);
        assert_eq!(result.unwrap(), Value::Bool(false));
        let result = run_source("fn f() -> bool { return true || 1 / 0 == 0; }", vec![]);
        assert_eq!(result.unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_conditions_must_be_bool() {
        let err = run_source(r#"fn f() -> str { if "yes" { return "a"; } return "b"; }"#, vec![])
            .unwrap_err();
        assert!(matches!(err, EngineError::Execution(msg) if msg.contains("bool")));
    }

    #[test]
    fn test_map_index_hit_and_miss() {
        let source = r#"fn f(params: map[str, str]) -> str { return params["service_name"]; }"#;
        let result = run_source(source, vec![params_map(&[("service_name", "billing")])]);
        assert_eq!(result.unwrap(), Value::Str("billing".to_string()));

        let err = run_source(source, vec![params_map(&[])]).unwrap_err();
        assert!(matches!(err, EngineError::Execution(msg) if msg.contains("'service_name'")));
    }

    #[test]
    fn test_string_index() {
        let run = |s: &str, i: &str| {
            let src = format!("fn f(s: str) -> str {{ return s[{i}]; }}");
            run_source(&src, vec![Value::Str(s.to_string())])
        };
        assert_eq!(run("héllo", "1").unwrap(), Value::Str("é".to_string()));
        assert_eq!(run("héllo", "-1").unwrap(), Value::Str("o".to_string()));
        assert!(matches!(
            run("ab", "5").unwrap_err(),
            EngineError::Execution(msg) if msg.contains("out of range")
        ));
    }

    #[test]
    fn test_assignment_reaches_outer_scope() {
        let source = r#"
            fn f() -> str {
                let out = "a";
                if true {
                    out = out + "b";
                }
                return out;
            }
        "#;
        assert_eq!(run_source(source, vec![]).unwrap(), Value::Str("ab".to_string()));
    }

    #[test]
    fn test_while_loop() {
        let source = r#"
            fn f() -> str {
                let n = 3;
                let out = "";
                while n > 0 {
                    out = out + str(n);
                    n = n - 1;
                }
                return out;
            }
        "#;
        assert_eq!(run_source(source, vec![]).unwrap(), Value::Str("321".to_string()));
    }

    #[test]
    fn test_builtin_calls() {
        let source = r#"
            fn f(params: map[str, str]) -> str {
                let name = get(params, "service_name", "unnamed");
                return upper(slice(name, 0, 4));
            }
        "#;
        let result = run_source(source, vec![params_map(&[("service_name", "billing")])]);
        assert_eq!(result.unwrap(), Value::Str("BILL".to_string()));
        let result = run_source(source, vec![params_map(&[])]);
        assert_eq!(result.unwrap(), Value::Str("UNNA".to_string()));
    }

    #[test]
    fn test_parameter_defaults() {
        let source = r#"fn f(a: str, sep: str = "-") -> str { return a + sep; }"#;
        let result = run_source(source, vec![Value::Str("x".to_string())]);
        assert_eq!(result.unwrap(), Value::Str("x-".to_string()));

        let result = run_source(
            source,
            vec![Value::Str("x".to_string()), Value::Str("_".to_string())],
        );
        assert_eq!(result.unwrap(), Value::Str("x_".to_string()));
    }

    #[test]
    fn test_missing_and_extra_arguments() {
        let source = "fn f(a: str) -> str { return a; }";
        assert!(matches!(
            run_source(source, vec![]).unwrap_err(),
            EngineError::Execution(msg) if msg.contains("'a'")
        ));
        assert!(matches!(
            run_source(
                source,
                vec![Value::Str("x".to_string()), Value::Str("y".to_string())]
            )
            .unwrap_err(),
            EngineError::Execution(msg) if msg.contains("takes 1 arguments")
        ));
    }

    #[test]
    fn test_declared_return_type_enforced() {
        let err = run_source("fn f() -> str { return 3; }", vec![]).unwrap_err();
        assert!(matches!(err, EngineError::Execution(msg) if msg.contains("declared to return")));
    }

    #[test]
    fn test_missing_return_is_an_error() {
        let err = run_source(r#"fn f() -> str { let x = "a"; }"#, vec![]).unwrap_err();
        assert!(matches!(err, EngineError::Execution(msg) if msg.contains("without returning")));
    }

    #[test]
    fn test_step_budget_exhaustion() {
        let limits = ExecLimits {
            step_budget: 100,
            ..ExecLimits::default()
        };
        let err = run_source_with(
            r#"fn f() -> str { while true { } return "x"; }"#,
            vec![],
            &limits,
            None,
        )
        .unwrap_err();
        match err {
            EngineError::Timeout(detail) => {
                assert!(detail.contains("step budget of 100"), "detail: {detail}")
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_memory_meter_trips_on_doubling() {
        let limits = ExecLimits {
            memory_limit: 4 * 1024,
            ..ExecLimits::default()
        };
        let source = r#"
            fn f() -> str {
                let x = "aaaaaaaaaaaaaaaa";
                while true {
                    x = x + x;
                }
                return x;
            }
        "#;
        let err = run_source_with(source, vec![], &limits, None).unwrap_err();
        assert_eq!(err, EngineError::MemoryLimit { limit: 4 * 1024 });
    }

    #[test]
    fn test_deadline_stops_abandoned_run() {
        let deadline = Instant::now() - Duration::from_millis(1);
        let err = run_source_with(
            r#"fn f() -> str { while true { } return "x"; }"#,
            vec![],
            &ExecLimits::default(),
            Some(deadline),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Timeout(_)));
    }

    #[test]
    fn test_block_bindings_release_memory() {
        // Loop allocates a sizeable block-local string each iteration; the
        // meter must not accumulate across iterations once scopes unwind.
        let limits = ExecLimits {
            memory_limit: 64 * 1024,
            ..ExecLimits::default()
        };
        let source = r#"
            fn f() -> str {
                let n = 0;
                while n < 200 {
                    if true {
                        let chunk = "0123456789012345678901234567890123456789";
                        n = n + len(chunk) - 39;
                    }
                }
                return str(n);
            }
        "#;
        let result = run_source_with(source, vec![], &limits, None);
        assert_eq!(result.unwrap(), Value::Str("200".to_string()));
    }
}
