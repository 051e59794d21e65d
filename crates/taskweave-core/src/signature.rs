//! Expected argument types and coercion.
//!
//! Planning output carries most argument values as strings; each
//! capability declares the types it actually expects per argument key,
//! and the resolver coerces resolved values right before invocation.
//! Keys with no declared expected type pass through unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// The scalar/collection type a capability expects for one argument key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedType {
    Int,
    Float,
    Bool,
    Text,
    List,
}

impl ExpectedType {
    /// The type's display name.
    pub fn name(&self) -> &'static str {
        match self {
            ExpectedType::Int => "int",
            ExpectedType::Float => "float",
            ExpectedType::Bool => "bool",
            ExpectedType::Text => "text",
            ExpectedType::List => "list",
        }
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Declared argument types for one capability, keyed by argument name.
///
/// Consulted only for coercion; dispatch validity is the registry's
/// concern, and a key with no entry performs no coercion.
///
/// # Examples
///
/// ```rust
/// use taskweave_core::{CapabilitySignature, ExpectedType};
///
/// let signature = CapabilitySignature::new()
///     .arg("segment_id", ExpectedType::Int)
///     .arg("top_n", ExpectedType::Int);
/// assert_eq!(signature.expected_for("segment_id"), Some(ExpectedType::Int));
/// assert_eq!(signature.expected_for("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapabilitySignature {
    expected: BTreeMap<String, ExpectedType>,
}

impl CapabilitySignature {
    /// Create an empty signature (no coercion on any key).
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the expected type for an argument key, builder-style.
    pub fn arg(mut self, key: impl Into<String>, expected: ExpectedType) -> Self {
        self.expected.insert(key.into(), expected);
        self
    }

    /// The declared type for a key, if any.
    pub fn expected_for(&self, key: &str) -> Option<ExpectedType> {
        self.expected.get(key).copied()
    }

    /// Whether the signature declares no keys.
    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }

    /// Number of declared keys.
    pub fn len(&self) -> usize {
        self.expected.len()
    }

    /// Iterate over declared keys and their expected types.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ExpectedType)> {
        self.expected.iter().map(|(key, ty)| (key.as_str(), *ty))
    }
}

/// A value could not be coerced to its declared expected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastError {
    value: String,
    target: ExpectedType,
}

impl CastError {
    fn new(value: &Value, target: ExpectedType) -> Self {
        Self {
            value: render(value),
            target,
        }
    }

    /// The offending value, rendered for display.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The type the value could not be coerced to.
    pub fn target(&self) -> ExpectedType {
        self.target
    }
}

impl fmt::Display for CastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot cast value '{}' to {}", self.value, self.target)
    }
}

impl std::error::Error for CastError {}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce a resolved argument value to its declared expected type.
///
/// Numeric strings parse to numbers, `"true"`/`"false"` parse to
/// booleans, anything stringifies to text, and a string against a
/// declared list type is parsed as a JSON list. Values already of the
/// expected shape pass through.
pub fn coerce(value: Value, expected: ExpectedType) -> Result<Value, CastError> {
    match expected {
        ExpectedType::Int => coerce_int(value),
        ExpectedType::Float => coerce_float(value),
        ExpectedType::Bool => coerce_bool(value),
        ExpectedType::Text => Ok(coerce_text(value)),
        ExpectedType::List => coerce_list(value),
    }
}

fn coerce_int(value: Value) -> Result<Value, CastError> {
    match &value {
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Ok(value)
            } else if let Some(x) = n.as_f64() {
                // Fractional numbers truncate toward zero.
                Ok(Value::Number((x as i64).into()))
            } else {
                Err(CastError::new(&value, ExpectedType::Int))
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(|i| Value::Number(i.into()))
            .map_err(|_| CastError::new(&value, ExpectedType::Int)),
        _ => Err(CastError::new(&value, ExpectedType::Int)),
    }
}

fn coerce_float(value: Value) -> Result<Value, CastError> {
    match &value {
        Value::Number(n) => match n.as_f64().and_then(Number::from_f64) {
            Some(number) => Ok(Value::Number(number)),
            None => Err(CastError::new(&value, ExpectedType::Float)),
        },
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| CastError::new(&value, ExpectedType::Float)),
        _ => Err(CastError::new(&value, ExpectedType::Float)),
    }
}

fn coerce_bool(value: Value) -> Result<Value, CastError> {
    match &value {
        Value::Bool(_) => Ok(value),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(CastError::new(&value, ExpectedType::Bool)),
        },
        Value::Number(n) => Ok(Value::Bool(n.as_f64().is_some_and(|x| x != 0.0))),
        _ => Err(CastError::new(&value, ExpectedType::Bool)),
    }
}

fn coerce_text(value: Value) -> Value {
    match value {
        Value::String(_) => value,
        other => Value::String(render(&other)),
    }
}

fn coerce_list(value: Value) -> Result<Value, CastError> {
    match &value {
        Value::Array(_) => Ok(value),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(parsed @ Value::Array(_)) => Ok(parsed),
            _ => Err(CastError::new(&value, ExpectedType::List)),
        },
        _ => Err(CastError::new(&value, ExpectedType::List)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_strings_coerce_to_integers() {
        assert_eq!(coerce(json!("3"), ExpectedType::Int).unwrap(), json!(3));
        assert_eq!(coerce(json!(" 5 "), ExpectedType::Int).unwrap(), json!(5));
        assert_eq!(coerce(json!(3), ExpectedType::Int).unwrap(), json!(3));
    }

    #[test]
    fn fractional_numbers_truncate_to_integers() {
        assert_eq!(coerce(json!(3.7), ExpectedType::Int).unwrap(), json!(3));
    }

    #[test]
    fn non_numeric_strings_fail_integer_coercion() {
        let err = coerce(json!("abc"), ExpectedType::Int).unwrap_err();
        assert_eq!(err.value(), "abc");
        assert_eq!(err.target(), ExpectedType::Int);
        assert!(coerce(json!("3.7"), ExpectedType::Int).is_err());
    }

    #[test]
    fn floats_coerce_from_strings_and_integers() {
        assert_eq!(coerce(json!("2.5"), ExpectedType::Float).unwrap(), json!(2.5));
        assert_eq!(coerce(json!(4), ExpectedType::Float).unwrap(), json!(4.0));
    }

    #[test]
    fn booleans_coerce_from_strings_and_numbers() {
        assert_eq!(coerce(json!("true"), ExpectedType::Bool).unwrap(), json!(true));
        assert_eq!(coerce(json!("False"), ExpectedType::Bool).unwrap(), json!(false));
        assert_eq!(coerce(json!(0), ExpectedType::Bool).unwrap(), json!(false));
        assert_eq!(coerce(json!(2), ExpectedType::Bool).unwrap(), json!(true));
        assert!(coerce(json!("yes"), ExpectedType::Bool).is_err());
    }

    #[test]
    fn anything_stringifies_to_text() {
        assert_eq!(coerce(json!("a"), ExpectedType::Text).unwrap(), json!("a"));
        assert_eq!(coerce(json!(3), ExpectedType::Text).unwrap(), json!("3"));
        assert_eq!(
            coerce(json!([1, 2]), ExpectedType::Text).unwrap(),
            json!("[1,2]")
        );
    }

    #[test]
    fn strings_parse_to_lists_when_a_list_is_declared() {
        assert_eq!(
            coerce(json!("[1, 2, 3]"), ExpectedType::List).unwrap(),
            json!([1, 2, 3])
        );
        assert_eq!(
            coerce(json!([4, 5]), ExpectedType::List).unwrap(),
            json!([4, 5])
        );
        assert!(coerce(json!("{\"a\": 1}"), ExpectedType::List).is_err());
        assert!(coerce(json!("not json"), ExpectedType::List).is_err());
    }

    #[test]
    fn signature_declares_per_key_types() {
        let signature = CapabilitySignature::new()
            .arg("segment_id", ExpectedType::Int)
            .arg("current_topic", ExpectedType::Text);
        assert_eq!(signature.len(), 2);
        assert_eq!(signature.expected_for("segment_id"), Some(ExpectedType::Int));
        assert_eq!(signature.expected_for("missing"), None);
    }
}
