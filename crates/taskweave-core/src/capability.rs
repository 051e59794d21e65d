//! The capability contract: named, typed analytic functions.
//!
//! A capability is the unit the scheduler invokes: it has a unique name,
//! declares expected argument types for coercion, and synchronously
//! turns a resolved argument map into a capability-native result. A
//! capability failure is fatal for the task that requested it; the
//! engine propagates it and never retries.

use crate::signature::CapabilitySignature;
use crate::value::{NativeValue, kind};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;

/// Resolved arguments for a single capability invocation.
///
/// Keys preserve the order the plan declared them in. The typed
/// accessors are for implementors: they turn transport values into the
/// shapes a capability works with, reporting structured errors for
/// anything unexpected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilityArgs {
    entries: IndexMap<String, Value>,
}

impl CapabilityArgs {
    /// Create an empty argument map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an argument value under a key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Insert an argument value, builder-style.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    /// Get an argument value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get an argument value by key, or fail with `MissingArgument`.
    pub fn require(&self, key: &str) -> Result<&Value, CapabilityError> {
        self.get(key).ok_or_else(|| CapabilityError::MissingArgument {
            key: key.to_string(),
        })
    }

    /// Require an integer argument.
    pub fn require_i64(&self, key: &str) -> Result<i64, CapabilityError> {
        let value = self.require(key)?;
        value.as_i64().ok_or_else(|| CapabilityError::InvalidArgument {
            key: key.to_string(),
            message: format!("expected an integer, got {}", kind(value)),
        })
    }

    /// Require a string argument.
    pub fn require_str(&self, key: &str) -> Result<&str, CapabilityError> {
        let value = self.require(key)?;
        value.as_str().ok_or_else(|| CapabilityError::InvalidArgument {
            key: key.to_string(),
            message: format!("expected a string, got {}", kind(value)),
        })
    }

    /// Require a list of integer ids.
    pub fn require_i64_list(&self, key: &str) -> Result<Vec<i64>, CapabilityError> {
        let value = self.require(key)?;
        let items = value.as_array().ok_or_else(|| CapabilityError::InvalidArgument {
            key: key.to_string(),
            message: format!("expected a list, got {}", kind(value)),
        })?;
        items
            .iter()
            .map(|item| {
                item.as_i64().ok_or_else(|| CapabilityError::InvalidArgument {
                    key: key.to_string(),
                    message: format!("expected a list of integers, got {}", kind(item)),
                })
            })
            .collect()
    }

    /// Get an integer argument, falling back to a default when absent.
    pub fn get_i64_or(&self, key: &str, default: i64) -> Result<i64, CapabilityError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.as_i64().ok_or_else(|| CapabilityError::InvalidArgument {
                key: key.to_string(),
                message: format!("expected an integer, got {}", kind(value)),
            }),
        }
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Render the argument map as a transport object (for audit records).
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        for (key, value) in &self.entries {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

impl FromIterator<(String, Value)> for CapabilityArgs {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Structured failure raised by a capability implementation.
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityError {
    /// A required argument key was absent.
    MissingArgument { key: String },

    /// An argument was present but had an unusable shape or value.
    InvalidArgument { key: String, message: String },

    /// The requested entity does not exist in the capability's data.
    NotFound { what: String },

    /// The capability failed internally.
    Internal { message: String },
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityError::MissingArgument { key } => {
                write!(f, "missing argument '{}'", key)
            }
            CapabilityError::InvalidArgument { key, message } => {
                write!(f, "invalid argument '{}': {}", key, message)
            }
            CapabilityError::NotFound { what } => write!(f, "not found: {}", what),
            CapabilityError::Internal { message } => {
                write!(f, "internal capability error: {}", message)
            }
        }
    }
}

impl std::error::Error for CapabilityError {}

/// Result type alias for capability invocations.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Trait defining a named analytic function the engine can invoke.
///
/// # Example
///
/// ```rust
/// use taskweave_core::{
///     Capability, CapabilityArgs, CapabilityResult, CapabilitySignature, ExpectedType,
///     NativeValue,
/// };
///
/// struct Doubler;
///
/// impl Capability for Doubler {
///     fn name(&self) -> &str {
///         "double"
///     }
///
///     fn signature(&self) -> CapabilitySignature {
///         CapabilitySignature::new().arg("value", ExpectedType::Int)
///     }
///
///     fn invoke(&self, args: &CapabilityArgs) -> CapabilityResult<NativeValue> {
///         Ok(NativeValue::Int(args.require_i64("value")? * 2))
///     }
/// }
/// ```
pub trait Capability: Send + Sync {
    /// The unique name the registry dispatches on.
    fn name(&self) -> &str;

    /// Human-readable description, used in listings.
    fn description(&self) -> &str {
        ""
    }

    /// Declared argument types, consulted only for coercion.
    ///
    /// The default declares nothing: every argument passes through
    /// uncoerced.
    fn signature(&self) -> CapabilitySignature {
        CapabilitySignature::new()
    }

    /// Execute with resolved arguments, producing a native result.
    fn invoke(&self, args: &CapabilityArgs) -> CapabilityResult<NativeValue>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors_read_typed_arguments() {
        let args = CapabilityArgs::new()
            .with("segment_id", json!(3))
            .with("current_topic", json!("economy"))
            .with("ids", json!([1, 2, 3]));

        assert_eq!(args.require_i64("segment_id").unwrap(), 3);
        assert_eq!(args.require_str("current_topic").unwrap(), "economy");
        assert_eq!(args.require_i64_list("ids").unwrap(), vec![1, 2, 3]);
        assert_eq!(args.get_i64_or("top_n", 10).unwrap(), 10);
    }

    #[test]
    fn missing_and_mistyped_arguments_are_structured_errors() {
        let args = CapabilityArgs::new().with("segment_id", json!("three"));

        assert!(matches!(
            args.require_i64("absent"),
            Err(CapabilityError::MissingArgument { .. })
        ));
        assert!(matches!(
            args.require_i64("segment_id"),
            Err(CapabilityError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn arguments_render_in_declaration_order() {
        let args = CapabilityArgs::new()
            .with("b", json!(1))
            .with("a", json!(2));
        let keys: Vec<&str> = args.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(args.to_value(), json!({ "a": 2, "b": 1 }));
    }
}
