//! One-shot sandboxed execution of validated convertor functions.
//!
//! Every call gets its own short-lived worker thread; results come back
//! over an mpsc channel and the orchestrator blocks only in
//! `recv_timeout`. On timeout the worker is abandoned, never forcibly
//! preempted: the interpreter's deadline probe stops it soon after, and
//! the step budget stops it unconditionally. Abandoned workers hold no
//! shared state, so later calls are unaffected.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::EngineError;
use crate::interp::run_function;
use crate::validator::ValidatedCallable;
use crate::value::Value;

/// Resource ceilings for a single execution.
///
/// The memory ceiling is a best-effort estimate of interpreter-visible
/// values, not an address-space cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecLimits {
    /// Wall-clock limit the orchestrator waits for a result
    pub timeout: Duration,
    /// Ceiling on estimated live plus transient bytes
    pub memory_limit: usize,
    /// Interpreter steps before the run is cut off
    pub step_budget: u64,
}

impl Default for ExecLimits {
    fn default() -> Self {
        ExecLimits {
            timeout: Duration::from_secs(5),
            memory_limit: 50 * 1024 * 1024,
            step_budget: 1_000_000,
        }
    }
}

/// Executes validated callables under [`ExecLimits`].
#[derive(Debug, Clone)]
pub struct SandboxExecutor {
    limits: ExecLimits,
    strict_args: bool,
}

impl Default for SandboxExecutor {
    fn default() -> Self {
        SandboxExecutor::new()
    }
}

impl SandboxExecutor {
    pub fn new() -> Self {
        SandboxExecutor {
            limits: ExecLimits::default(),
            strict_args: true,
        }
    }

    pub fn with_limits(limits: ExecLimits) -> Self {
        SandboxExecutor {
            limits,
            strict_args: true,
        }
    }

    /// Disable the positional argument type check. The body still fails
    /// dynamically if it misuses a value.
    pub fn lenient_args(mut self) -> Self {
        self.strict_args = false;
        self
    }

    pub fn limits(&self) -> &ExecLimits {
        &self.limits
    }

    /// Run `callable` with positional `args` and return its string result.
    ///
    /// The callable is consumed: one validation, one run. Arguments are
    /// checked against the declared parameter types first (unless lenient),
    /// then moved into a dedicated worker. `recv_timeout` expiry maps to
    /// [`EngineError::Timeout`] and abandons the worker.
    pub fn execute(
        &self,
        callable: ValidatedCallable,
        args: Vec<Value>,
    ) -> Result<String, EngineError> {
        if self.strict_args {
            for (arg, param) in args.iter().zip(&callable.signature().params) {
                if !arg.matches_tag(param.ty) {
                    return Err(EngineError::TypeMismatch {
                        expected: param.ty.name().to_string(),
                        found: arg.type_name().to_string(),
                    });
                }
            }
        }

        debug!(
            callable = callable.name(),
            args = args.len(),
            timeout_ms = self.limits.timeout.as_millis() as u64,
            "dispatching to worker"
        );

        let limits = self.limits;
        let deadline = Instant::now() + limits.timeout;
        let def = callable.into_def();
        let (tx, rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("convertor-worker".to_string())
            .spawn(move || {
                let result = run_function(&def, args, &limits, Some(deadline));
                // A receiver gone means the orchestrator already timed out
                let _ = tx.send(result);
            });
        if let Err(e) = worker {
            return Err(EngineError::Execution(format!(
                "Failed to spawn worker thread: {e}"
            )));
        }

        let value = match rx.recv_timeout(limits.timeout) {
            Ok(outcome) => outcome?,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                debug!(timeout_ms = limits.timeout.as_millis() as u64, "worker abandoned");
                return Err(EngineError::Timeout(format!(
                    "no result within {:?}",
                    limits.timeout
                )));
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(EngineError::Execution(
                    "Worker stopped before producing a result".to_string(),
                ));
            }
        };

        match value {
            Value::Str(s) => Ok(s),
            other => Err(EngineError::Execution(format!(
                "Convertor produced a '{}' value where a 'str' result was required",
                other.type_name()
            ))),
        }
    }
}
