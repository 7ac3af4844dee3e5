//! Serializable call-signature descriptors.
//!
//! Expected shapes are declared as plain data and compared structurally
//! against the shape computed from a parsed definition. No live callable
//! inspection is involved anywhere: the descriptor owns names, order,
//! annotations, and default-value presence, and derived equality is the
//! comparison.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// TYPE TAGS
// =============================================================================

/// The annotation vocabulary of the convertor language.
///
/// `Any` stands for an omitted annotation and never appears in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Str,
    Int,
    Bool,
    StrMap,
    Any,
}

impl TypeTag {
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Str => "str",
            TypeTag::Int => "int",
            TypeTag::Bool => "bool",
            TypeTag::StrMap => "map[str, str]",
            TypeTag::Any => "any",
        }
    }

    /// Whether an annotation was written at all.
    pub fn is_annotated(&self) -> bool {
        !matches!(self, TypeTag::Any)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// SIGNATURES
// =============================================================================

/// One declared parameter: name, annotation, and default presence.
///
/// Default values themselves are not part of the comparable shape, only the
/// fact that one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub ty: TypeTag,
    pub has_default: bool,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>, ty: TypeTag) -> Self {
        ParamSpec {
            name: name.into(),
            ty,
            has_default: false,
        }
    }

    pub fn with_default(name: impl Into<String>, ty: TypeTag) -> Self {
        ParamSpec {
            name: name.into(),
            ty,
            has_default: true,
        }
    }
}

impl fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.ty.is_annotated() {
            write!(f, ": {}", self.ty)?;
        }
        if self.has_default {
            write!(f, " = ...")?;
        }
        Ok(())
    }
}

/// The complete comparable shape of a function: ordered parameters plus the
/// declared return annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSpec {
    pub params: Vec<ParamSpec>,
    pub return_ty: TypeTag,
}

impl SignatureSpec {
    pub fn new(params: Vec<ParamSpec>, return_ty: TypeTag) -> Self {
        SignatureSpec { params, return_ty }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for SignatureSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ")")?;
        if self.return_ty.is_annotated() {
            write!(f, " -> {}", self.return_ty)?;
        }
        Ok(())
    }
}

/// The fixed shape every dynamic convertor must declare: one required
/// parameter holding the string-to-string parameter map, returning a string.
pub fn convertor_signature() -> SignatureSpec {
    SignatureSpec::new(
        vec![ParamSpec::required("params", TypeTag::StrMap)],
        TypeTag::Str,
    )
}
