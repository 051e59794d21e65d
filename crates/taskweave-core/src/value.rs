//! Capability-native values and transport normalization.
//!
//! Capabilities produce results in their own terms: tabular listings,
//! timestamps, numeric aggregates, nested containers. Before a result is
//! stored in execution outputs (or handed to anything outside the
//! engine) it is normalized into a transport-safe [`Value`] tree of
//! null/bool/number/string/array/object nodes, recursively, with no
//! loss of nesting.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Human-readable kind of a transport value, for error messages.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A capability-native result value.
///
/// This is the tagged form capabilities build their results in;
/// [`NativeValue::into_transport`] flattens it into the transport tree.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    List(Vec<NativeValue>),
    Map(BTreeMap<String, NativeValue>),
    Table(Table),
}

impl NativeValue {
    /// Build a `Map` value from key/value pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, NativeValue)>,
    {
        NativeValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a `List` value from items.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = NativeValue>,
    {
        NativeValue::List(items.into_iter().collect())
    }

    /// Normalize into the transport tree.
    ///
    /// Tables become arrays of objects, timestamps become RFC 3339
    /// strings, and non-finite floats become null (they have no JSON
    /// form). Nested containers are normalized recursively.
    pub fn into_transport(self) -> Value {
        match self {
            NativeValue::Null => Value::Null,
            NativeValue::Bool(value) => Value::Bool(value),
            NativeValue::Int(value) => Value::Number(value.into()),
            NativeValue::Float(value) => {
                Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
            }
            NativeValue::Text(value) => Value::String(value),
            NativeValue::Timestamp(value) => Value::String(value.to_rfc3339()),
            NativeValue::List(items) => {
                Value::Array(items.into_iter().map(NativeValue::into_transport).collect())
            }
            NativeValue::Map(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key, value.into_transport());
                }
                Value::Object(map)
            }
            NativeValue::Table(table) => table.into_transport(),
        }
    }
}

impl From<bool> for NativeValue {
    fn from(value: bool) -> Self {
        NativeValue::Bool(value)
    }
}

impl From<i64> for NativeValue {
    fn from(value: i64) -> Self {
        NativeValue::Int(value)
    }
}

impl From<f64> for NativeValue {
    fn from(value: f64) -> Self {
        NativeValue::Float(value)
    }
}

impl From<&str> for NativeValue {
    fn from(value: &str) -> Self {
        NativeValue::Text(value.to_string())
    }
}

impl From<String> for NativeValue {
    fn from(value: String) -> Self {
        NativeValue::Text(value)
    }
}

impl From<DateTime<Utc>> for NativeValue {
    fn from(value: DateTime<Utc>) -> Self {
        NativeValue::Timestamp(value)
    }
}

impl From<Table> for NativeValue {
    fn from(value: Table) -> Self {
        NativeValue::Table(value)
    }
}

impl From<Value> for NativeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => NativeValue::Null,
            Value::Bool(b) => NativeValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    NativeValue::Int(i)
                } else if let Some(x) = n.as_f64() {
                    NativeValue::Float(x)
                } else {
                    NativeValue::Null
                }
            }
            Value::String(s) => NativeValue::Text(s),
            Value::Array(items) => {
                NativeValue::List(items.into_iter().map(NativeValue::from).collect())
            }
            Value::Object(map) => NativeValue::Map(
                map.into_iter().map(|(k, v)| (k, NativeValue::from(v))).collect(),
            ),
        }
    }
}

/// A lightweight record batch: rows of named columns.
///
/// The tabular analogue of a data frame, kept record-oriented so that
/// transport normalization is a plain array of objects. Column order is
/// preserved per row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    rows: Vec<IndexMap<String, NativeValue>>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row of `(column, value)` pairs.
    pub fn push_row<K, I>(&mut self, row: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, NativeValue)>,
    {
        self.rows
            .push(row.into_iter().map(|(k, v)| (k.into(), v)).collect());
    }

    /// Append a row, builder-style.
    pub fn with_row<K, I>(mut self, row: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, NativeValue)>,
    {
        self.push_row(row);
        self
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow the rows.
    pub fn rows(&self) -> &[IndexMap<String, NativeValue>] {
        &self.rows
    }

    /// Normalize into a transport array of objects.
    pub fn into_transport(self) -> Value {
        Value::Array(
            self.rows
                .into_iter()
                .map(|row| {
                    let mut object = Map::new();
                    for (column, value) in row {
                        object.insert(column, value.into_transport());
                    }
                    Value::Object(object)
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn scalars_normalize_to_their_json_forms() {
        assert_eq!(NativeValue::Null.into_transport(), Value::Null);
        assert_eq!(NativeValue::Bool(true).into_transport(), json!(true));
        assert_eq!(NativeValue::Int(7).into_transport(), json!(7));
        assert_eq!(NativeValue::Float(2.5).into_transport(), json!(2.5));
        assert_eq!(
            NativeValue::Text("ok".to_string()).into_transport(),
            json!("ok")
        );
    }

    #[test]
    fn non_finite_floats_normalize_to_null() {
        assert_eq!(NativeValue::Float(f64::NAN).into_transport(), Value::Null);
        assert_eq!(
            NativeValue::Float(f64::INFINITY).into_transport(),
            Value::Null
        );
    }

    #[test]
    fn timestamps_normalize_to_rfc3339_strings() {
        let ts = Utc.with_ymd_and_hms(2024, 11, 3, 9, 30, 0).unwrap();
        let transport = NativeValue::Timestamp(ts).into_transport();
        assert_eq!(transport, json!("2024-11-03T09:30:00+00:00"));
    }

    #[test]
    fn tables_normalize_to_arrays_of_objects() {
        let table = Table::new()
            .with_row([
                ("topic", NativeValue::from("economy")),
                ("probability", NativeValue::Float(0.4)),
            ])
            .with_row([
                ("topic", NativeValue::from("sports")),
                ("probability", NativeValue::Float(0.1)),
            ]);

        let nested = NativeValue::map([("transitions", NativeValue::Table(table))]);
        assert_eq!(
            nested.into_transport(),
            json!({
                "transitions": [
                    { "topic": "economy", "probability": 0.4 },
                    { "topic": "sports", "probability": 0.1 },
                ]
            })
        );
    }

    #[test]
    fn nested_containers_normalize_recursively() {
        let value = NativeValue::map([(
            "inner",
            NativeValue::list([NativeValue::Int(1), NativeValue::Float(f64::NAN)]),
        )]);
        assert_eq!(value.into_transport(), json!({ "inner": [1, null] }));
    }

    #[test]
    fn transport_values_convert_back_to_native() {
        let native = NativeValue::from(json!({ "id": 3, "share": 0.5, "tags": ["a"] }));
        let NativeValue::Map(entries) = native else {
            panic!("expected a map");
        };
        assert_eq!(entries.get("id"), Some(&NativeValue::Int(3)));
        assert_eq!(entries.get("share"), Some(&NativeValue::Float(0.5)));
    }
}
