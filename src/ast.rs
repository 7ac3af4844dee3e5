//! AST for the convertor snippet language.
//!
//! A snippet is a tiny module: comments plus function definitions, of which
//! the engine only ever runs one. The tree is deliberately self-describing:
//!
//! - **FunctionDef** carries everything needed to compute its comparable
//!   signature descriptor without touching a runtime
//! - **Stmt / Expr** nodes carry source spans for error reporting
//! - **Literal** is the terminal value vocabulary (strings, integers,
//!   booleans) shared by expressions and parameter defaults
//!
//! There are no import, attribute-access, or closure nodes. What the tree
//! cannot represent, the engine cannot be asked to run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::signature::{ParamSpec, SignatureSpec, TypeTag};

// =============================================================================
// SOURCE SPAN
// =============================================================================

/// Source span for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of start
    pub start: usize,
    /// Byte offset of end
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a span covering two spans
    pub fn merge(a: Span, b: Span) -> Span {
        Span {
            start: a.start.min(b.start),
            end: a.end.max(b.end),
        }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Is this span empty?
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Create a synthetic span (for builder-constructed nodes)
    pub fn synthetic() -> Self {
        Self {
            start: usize::MAX,
            end: usize::MAX,
        }
    }

    /// Check if this span is synthetic (generated, not from source)
    pub fn is_synthetic(&self) -> bool {
        self.start == usize::MAX && self.end == usize::MAX
    }
}

// =============================================================================
// TOP LEVEL
// =============================================================================

/// A complete parsed snippet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snippet {
    pub items: Vec<Item>,
}

impl Snippet {
    /// All function definitions, in source order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(def) => Some(def),
            Item::Comment(_) => None,
        })
    }

    /// The definition the engine will use: the first one in source order
    pub fn first_function(&self) -> Option<&FunctionDef> {
        self.functions().next()
    }

    pub fn function_count(&self) -> usize {
        self.functions().count()
    }
}

/// A single top-level item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Function(FunctionDef),
    Comment(String),
}

// =============================================================================
// FUNCTION DEFINITIONS
// =============================================================================

/// A function definition: `fn name(params) -> ty { body }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<ParamDecl>,
    /// Declared return annotation; `Any` when omitted
    pub return_ty: TypeTag,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl FunctionDef {
    /// Compute the comparable signature descriptor for this definition.
    ///
    /// Default values contribute presence only; their contents are not part
    /// of the comparable shape.
    pub fn signature(&self) -> SignatureSpec {
        let params = self
            .params
            .iter()
            .map(|p| ParamSpec {
                name: p.name.clone(),
                ty: p.ty,
                has_default: p.default.is_some(),
            })
            .collect();
        SignatureSpec::new(params, self.return_ty)
    }
}

/// One declared parameter: `name[: ty][= literal]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    /// Declared annotation; `Any` when omitted
    pub ty: TypeTag,
    pub default: Option<Literal>,
    pub span: Span,
}

// =============================================================================
// STATEMENTS
// =============================================================================

/// A single statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `let name = expr;`
    Let {
        name: String,
        value: Expr,
        span: Span,
    },

    /// `name = expr;` (name must already be declared)
    Assign {
        name: String,
        value: Expr,
        span: Span,
    },

    /// `if cond { ... } else { ... }` - else-if chains desugar into a
    /// single-statement else body
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
        span: Span,
    },

    /// `while cond { ... }`
    While {
        cond: Expr,
        body: Vec<Stmt>,
        span: Span,
    },

    /// `return expr;`
    Return { value: Expr, span: Span },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Let { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Return { span, .. } => *span,
        }
    }
}

// =============================================================================
// EXPRESSIONS
// =============================================================================

/// Terminal values: shared by expressions and parameter defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Str(String),
    Int(i64),
    Bool(bool),
}

/// An expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal { value: Literal, span: Span },

    /// A variable reference: parameter or prior `let`
    Var { name: String, span: Span },

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },

    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },

    /// Guarded subscript: `base[index]`
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },

    /// Call to an allow-listed builtin: `name(args)`
    Call {
        name: String,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// Create a string literal (synthetic span)
    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal {
            value: Literal::Str(s.into()),
            span: Span::synthetic(),
        }
    }

    /// Create an integer literal (synthetic span)
    pub fn integer(i: i64) -> Self {
        Expr::Literal {
            value: Literal::Int(i),
            span: Span::synthetic(),
        }
    }

    /// Create a boolean literal (synthetic span)
    pub fn boolean(b: bool) -> Self {
        Expr::Literal {
            value: Literal::Bool(b),
            span: Span::synthetic(),
        }
    }

    /// Create a variable reference (synthetic span)
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var {
            name: name.into(),
            span: Span::synthetic(),
        }
    }

    // =========================================================================
    // EXTRACTORS
    // =========================================================================

    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. }
            | Expr::Var { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Index { span, .. }
            | Expr::Call { span, .. } => *span,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!` - boolean negation
    Not,
    /// `-` - checked integer negation
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
            UnaryOp::Neg => write!(f, "-"),
        }
    }
}

/// Binary operators, loosest-binding first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
