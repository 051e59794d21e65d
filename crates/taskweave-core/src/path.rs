//! Property paths: the small extraction sublanguage over transport values.
//!
//! A path is an ordered sequence of field names and array indices,
//! written in dotted form (`"a.b.0.c"`) on the wire and applied left to
//! right against a [`Value`]. A segment of ASCII digits is an index;
//! against an object it falls back to a string-key lookup, which is what
//! the dotted form means for object keys that happen to be numeric.

use crate::value::kind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One step of a property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object member access by field name.
    Field(String),
    /// Array element access by zero-based index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{}", name),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Errors parsing a dotted path string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// The path string is empty.
    Empty,
    /// A dot-separated segment is empty (e.g. `"a..b"`).
    EmptySegment { position: usize },
}

impl fmt::Display for PathParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathParseError::Empty => write!(f, "Property path cannot be empty"),
            PathParseError::EmptySegment { position } => {
                write!(f, "Property path has an empty segment at position {}", position)
            }
        }
    }
}

impl std::error::Error for PathParseError {}

/// Errors applying a path to a value.
#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    /// An object has no member with the requested name.
    MissingField { field: String, path: PropertyPath },
    /// An array index is out of range.
    IndexOutOfRange {
        index: usize,
        len: usize,
        path: PropertyPath,
    },
    /// A segment cannot be applied to the value shape it met.
    WrongShape {
        segment: String,
        found: &'static str,
        path: PropertyPath,
    },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::MissingField { field, path } => {
                write!(f, "property '{}' not found: no field '{}'", path, field)
            }
            PathError::IndexOutOfRange { index, len, path } => write!(
                f,
                "property '{}' not found: index {} out of range for array of length {}",
                path, index, len
            ),
            PathError::WrongShape {
                segment,
                found,
                path,
            } => write!(
                f,
                "property '{}' not found: segment '{}' cannot be applied to {}",
                path, segment, found
            ),
        }
    }
}

impl std::error::Error for PathError {}

/// An ordered sequence of field/index accessors.
///
/// # Examples
///
/// ```rust
/// use taskweave_core::PropertyPath;
/// use serde_json::json;
///
/// let path = PropertyPath::parse("a.b.0.c").unwrap();
/// let value = json!({ "a": { "b": [{ "c": 7 }] } });
/// assert_eq!(path.resolve(&value).unwrap(), &json!(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyPath(Vec<PathSegment>);

impl PropertyPath {
    /// Parse a dotted path string into segments.
    pub fn parse(path: impl AsRef<str>) -> Result<Self, PathParseError> {
        let path = path.as_ref();
        if path.is_empty() {
            return Err(PathParseError::Empty);
        }
        let mut segments = Vec::new();
        for (position, part) in path.split('.').enumerate() {
            if part.is_empty() {
                return Err(PathParseError::EmptySegment { position });
            }
            if part.bytes().all(|b| b.is_ascii_digit()) {
                match part.parse::<usize>() {
                    Ok(index) => segments.push(PathSegment::Index(index)),
                    // A digit run too large for an index can only be a key.
                    Err(_) => segments.push(PathSegment::Field(part.to_string())),
                }
            } else {
                segments.push(PathSegment::Field(part.to_string()));
            }
        }
        Ok(Self(segments))
    }

    /// Build a path from already-typed segments.
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Borrow the segments.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Apply the path against a value, left to right.
    pub fn resolve<'v>(&self, value: &'v Value) -> Result<&'v Value, PathError> {
        let mut current = value;
        for segment in &self.0 {
            current = match (segment, current) {
                (PathSegment::Field(name), Value::Object(map)) => {
                    map.get(name).ok_or_else(|| PathError::MissingField {
                        field: name.clone(),
                        path: self.clone(),
                    })?
                }
                (PathSegment::Index(index), Value::Array(items)) => {
                    items.get(*index).ok_or_else(|| PathError::IndexOutOfRange {
                        index: *index,
                        len: items.len(),
                        path: self.clone(),
                    })?
                }
                // Digit segments fall back to string-key lookup on objects.
                (PathSegment::Index(index), Value::Object(map)) => {
                    map.get(&index.to_string())
                        .ok_or_else(|| PathError::MissingField {
                            field: index.to_string(),
                            path: self.clone(),
                        })?
                }
                (segment, other) => {
                    return Err(PathError::WrongShape {
                        segment: segment.to_string(),
                        found: kind(other),
                        path: self.clone(),
                    });
                }
            };
        }
        Ok(current)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            if position > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for PropertyPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<PropertyPath> for String {
    fn from(path: PropertyPath) -> Self {
        path.to_string()
    }
}

impl TryFrom<String> for PropertyPath {
    type Error = PathParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_fields_and_indices() {
        let path = PropertyPath::parse("a.b.0.c").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Field("a".to_string()),
                PathSegment::Field("b".to_string()),
                PathSegment::Index(0),
                PathSegment::Field("c".to_string()),
            ]
        );
        assert_eq!(path.to_string(), "a.b.0.c");
    }

    #[test]
    fn rejects_empty_paths_and_segments() {
        assert_eq!(PropertyPath::parse(""), Err(PathParseError::Empty));
        assert_eq!(
            PropertyPath::parse("a..b"),
            Err(PathParseError::EmptySegment { position: 1 })
        );
    }

    #[test]
    fn resolves_nested_structures() {
        let value = json!({ "a": { "b": [{ "c": 7 }] } });
        let path = PropertyPath::parse("a.b.0.c").unwrap();
        assert_eq!(path.resolve(&value).unwrap(), &json!(7));
    }

    #[test]
    fn missing_field_is_an_error() {
        let value = json!({ "a": { "b": [{ "c": 7 }] } });
        let path = PropertyPath::parse("x").unwrap();
        assert!(matches!(
            path.resolve(&value),
            Err(PathError::MissingField { .. })
        ));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let value = json!({ "items": [1, 2] });
        let path = PropertyPath::parse("items.5").unwrap();
        assert!(matches!(
            path.resolve(&value),
            Err(PathError::IndexOutOfRange { index: 5, len: 2, .. })
        ));
    }

    #[test]
    fn digit_segment_falls_back_to_object_key() {
        let value = json!({ "0": "zero" });
        let path = PropertyPath::parse("0").unwrap();
        assert_eq!(path.resolve(&value).unwrap(), &json!("zero"));
    }

    #[test]
    fn index_against_scalar_is_wrong_shape() {
        let value = json!(42);
        let path = PropertyPath::parse("field").unwrap();
        assert!(matches!(
            path.resolve(&value),
            Err(PathError::WrongShape { found: "a number", .. })
        ));
    }

    #[test]
    fn serde_round_trips_as_dotted_string() {
        let path = PropertyPath::parse("a.0.b").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"a.0.b\"");
        let back: PropertyPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
