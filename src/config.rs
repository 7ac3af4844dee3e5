//! Template metadata shapes and per-parameter transform chains.
//!
//! The collaborating scaffolding tool hands these records over as YAML.
//! Field names follow that external convention (`innerConvertor`), so the
//! serde renames here are load-bearing. Metadata problems get their own
//! error surface; they are authoring mistakes, not engine failures.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::error::EngineError;
use crate::transforms::{invoke, ArgValue};

/// Errors raised while loading or validating template metadata.
#[derive(Debug, Error)]
pub enum MetaError {
    #[error("Failed to parse template metadata: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid template metadata: {0}")]
    Invalid(String),
}

// =============================================================================
// SHAPES
// =============================================================================

/// A declarative reference to a built-in transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRef {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub params: BTreeMap<String, ArgValue>,
}

/// One derived-parameter record from template metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub ask: bool,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<String>,
    #[serde(
        default,
        rename = "innerConvertor",
        deserialize_with = "null_as_default"
    )]
    pub inner_convertor: Vec<TransformRef>,
    #[serde(default)]
    pub convertor: Option<String>,
}

/// The full metadata document: the parameter list and nothing else.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateMeta {
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Vec<ParameterSpec>,
}

fn default_true() -> bool {
    true
}

/// YAML writes an empty value as an explicit null; treat that like a
/// missing key instead of failing deserialization.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TemplateMeta {
    /// Parse a metadata document and run the cross-field checks serde
    /// cannot express.
    pub fn from_yaml(text: &str) -> Result<Self, MetaError> {
        let meta: TemplateMeta = serde_yaml::from_str(text)?;
        meta.validate()?;
        Ok(meta)
    }

    /// A parameter that is never asked for but carries a transform chain
    /// has nothing to transform unless it names a `target` parameter.
    pub fn validate(&self) -> Result<(), MetaError> {
        for param in &self.parameters {
            let target_missing = param
                .target
                .as_deref()
                .map_or(true, |target| target.is_empty());
            if !param.inner_convertor.is_empty() && !param.ask && target_missing {
                return Err(MetaError::Invalid(format!(
                    "Parameter '{}': when 'innerConvertor' exists and 'ask' is false, \
                     'target' must be provided.",
                    param.name
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// TRANSFORM CHAINS
// =============================================================================

/// Apply each referenced transform in order, threading the subject: the
/// first reference receives `subject`, every later one receives the
/// previous output. The current value is bound to the `value` parameter
/// of each call; a reference that binds `value` itself is rejected, since
/// the chain owns that binding.
pub fn apply_transform_chain(
    refs: &[TransformRef],
    subject: &str,
) -> Result<String, EngineError> {
    let mut current = subject.to_string();
    for reference in refs {
        if reference.params.contains_key("value") {
            return Err(EngineError::InvalidParameter(format!(
                "Transform '{}' in a chain must not bind 'value' explicitly",
                reference.name
            )));
        }
        let mut params = reference.params.clone();
        params.insert("value".to_string(), ArgValue::Str(current));
        debug!(transform = reference.name.as_str(), "applying chained transform");
        current = invoke(&reference.name, &params)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tref(name: &str, params: &[(&str, ArgValue)]) -> TransformRef {
        TransformRef {
            name: name.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_parse_full_metadata_document() {
        let text = r#"
parameters:
  - name: service_name
    description: Human readable service name
    ask: true
    choices:
      - Billing Core
      - Order Intake
  - name: module_name
    description: Derived module identifier
    target: service_name
    innerConvertor:
      - name: change_case
        params:
          caseType: snake
      - name: substr
        params:
          start: 0
          end: 12
  - name: greeting
    description: Computed greeting
    convertor: |
      fn convert(params: map[str, str]) -> str {
          return "hello " + params["service_name"];
      }
"#;
        let meta = TemplateMeta::from_yaml(text).unwrap();
        assert_eq!(meta.parameters.len(), 3);

        let asked = &meta.parameters[0];
        assert!(asked.ask);
        assert!(asked.required, "required defaults to true");
        assert_eq!(asked.choices.len(), 2);
        assert!(asked.inner_convertor.is_empty());

        let derived = &meta.parameters[1];
        assert!(!derived.ask, "ask defaults to false");
        assert_eq!(derived.target.as_deref(), Some("service_name"));
        assert_eq!(derived.inner_convertor.len(), 2);
        assert_eq!(derived.inner_convertor[0].name, "change_case");
        assert_eq!(
            derived.inner_convertor[0].params.get("caseType"),
            Some(&ArgValue::Str("snake".to_string()))
        );
        assert_eq!(
            derived.inner_convertor[1].params.get("start"),
            Some(&ArgValue::Int(0))
        );

        let computed = &meta.parameters[2];
        assert!(computed.convertor.as_deref().unwrap().contains("fn convert"));
    }

    #[test]
    fn test_empty_yaml_keys_read_as_defaults() {
        let text = r#"
parameters:
  - name: plain
    description: No extras at all
    choices:
    innerConvertor:
"#;
        let meta = TemplateMeta::from_yaml(text).unwrap();
        let param = &meta.parameters[0];
        assert!(param.choices.is_empty());
        assert!(param.inner_convertor.is_empty());
        assert_eq!(param.target, None);
        assert_eq!(param.convertor, None);
    }

    #[test]
    fn test_unasked_chain_requires_target() {
        let text = r#"
parameters:
  - name: module_name
    description: Derived module identifier
    innerConvertor:
      - name: change_case
        params:
          caseType: snake
"#;
        let err = TemplateMeta::from_yaml(text).unwrap_err();
        match err {
            MetaError::Invalid(msg) => {
                assert!(msg.contains("module_name"));
                assert!(msg.contains("'target' must be provided"));
            }
            other => panic!("expected invalid metadata, got {other}"),
        }
    }

    #[test]
    fn test_empty_target_counts_as_missing() {
        let text = r#"
parameters:
  - name: module_name
    description: Derived module identifier
    target: ""
    innerConvertor:
      - name: change_case
        params:
          caseType: snake
"#;
        assert!(matches!(
            TemplateMeta::from_yaml(text),
            Err(MetaError::Invalid(_))
        ));
    }

    #[test]
    fn test_asked_chain_needs_no_target() {
        let text = r#"
parameters:
  - name: module_name
    description: Asked for, then normalized
    ask: true
    innerConvertor:
      - name: change_case
        params:
          caseType: snake
"#;
        assert!(TemplateMeta::from_yaml(text).is_ok());
    }

    #[test]
    fn test_malformed_yaml_is_a_parse_error() {
        let err = TemplateMeta::from_yaml("parameters: [unclosed").unwrap_err();
        assert!(matches!(err, MetaError::Parse(_)));
    }

    #[test]
    fn test_chain_threads_the_subject() {
        let refs = vec![
            tref("change_case", &[("caseType", ArgValue::Str("snake".to_string()))]),
            tref("substr", &[("start", ArgValue::Int(0)), ("end", ArgValue::Int(7))]),
        ];
        let result = apply_transform_chain(&refs, "Service Name").unwrap();
        assert_eq!(result, "service");
    }

    #[test]
    fn test_chain_order_matters() {
        let truncate_then_upper = vec![
            tref("substr", &[("end", ArgValue::Int(4))]),
            tref("change_case", &[("caseType", ArgValue::Str("upper".to_string()))]),
        ];
        assert_eq!(
            apply_transform_chain(&truncate_then_upper, "abcdefgh").unwrap(),
            "ABCD"
        );

        let upper_then_truncate = vec![
            tref("change_case", &[("caseType", ArgValue::Str("upper".to_string()))]),
            tref("substr", &[("start", ArgValue::Int(-4))]),
        ];
        assert_eq!(
            apply_transform_chain(&upper_then_truncate, "abcdefgh").unwrap(),
            "EFGH"
        );
    }

    #[test]
    fn test_empty_chain_returns_subject() {
        assert_eq!(apply_transform_chain(&[], "as-is").unwrap(), "as-is");
    }

    #[test]
    fn test_chain_rejects_explicit_value_binding() {
        let refs = vec![tref(
            "change_case",
            &[
                ("caseType", ArgValue::Str("snake".to_string())),
                ("value", ArgValue::Str("smuggled".to_string())),
            ],
        )];
        let err = apply_transform_chain(&refs, "subject").unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(msg) if msg.contains("'value'")));
    }

    #[test]
    fn test_chain_propagates_unknown_transform() {
        let refs = vec![tref("reverse", &[])];
        let err = apply_transform_chain(&refs, "abc").unwrap_err();
        assert_eq!(err, EngineError::UnknownTransform("reverse".to_string()));
    }
}
