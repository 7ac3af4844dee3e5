//! convertor-engine: Bounded dynamic transform execution for template scaffolding
//!
//! This crate contains the engine behind derived template parameters, with
//! NO prompting, file traversal, or rendering:
//! - Nom-based parser and AST for the convertor snippet language
//! - Call-signature validation against declarative expected shapes
//! - Capability resolution (allow-listed builtins, nothing ambient)
//! - One-shot sandboxed execution under wall-clock, step, and memory limits
//! - Immutable built-in transform registry (`change_case`, `substr`)
//! - Template metadata shapes and per-parameter transform chains
//!
//! The two entry points most callers want are [`DynamicConvertor`] for
//! snippet-defined convertors and [`transforms::invoke`] for the built-in
//! catalog.

pub mod ast;
pub mod builtins;
pub mod casing;
pub mod config;
pub mod convertor;
pub mod error;
pub mod executor;
pub mod parser;
pub mod signature;
pub mod transforms;
pub mod validator;
pub mod value;

mod interp;

// Re-export commonly used types
pub use ast::{FunctionDef, Snippet, Span};
pub use casing::CaseStyle;
pub use config::{apply_transform_chain, MetaError, ParameterSpec, TemplateMeta, TransformRef};
pub use convertor::DynamicConvertor;
pub use error::EngineError;
pub use executor::{ExecLimits, SandboxExecutor};
pub use parser::parse_snippet;
pub use signature::{convertor_signature, ParamSpec, SignatureSpec, TypeTag};
pub use transforms::{invoke, ArgValue, TransformDescriptor};
pub use validator::{validate, ValidatedCallable};
pub use value::Value;
