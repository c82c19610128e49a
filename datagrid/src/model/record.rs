//! Dynamic grid record

use std::collections::BTreeMap;
use std::collections::HashMap;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::RowData;
use super::Value;
use crate::error::GridError;

/// A dynamic row with named fields.
///
/// Records hold field values as a `HashMap<String, Value>`. Child rows of a
/// hierarchical data set live in a [`Value::Records`] field (conventionally
/// `"children"`).
///
/// # Example
///
/// ```
/// use datagrid::model::Record;
///
/// let record = Record::new()
///     .set("name", "Contoso")
///     .set("revenue", 1_000_000i64);
///
/// assert_eq!(record.get_str("name"), Some("Contoso"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub(crate) fields: HashMap<String, Value>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_map(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let fields = map
            .into_iter()
            .map(|(key, value)| (key, Value::from_json(value)))
            .collect();
        Self { fields }
    }

    /// Builds a record from a JSON object.
    pub fn from_json(json: serde_json::Value) -> Result<Self, GridError> {
        match json {
            serde_json::Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(GridError::Json {
                actual: json_type_name(&other),
            }),
        }
    }

    /// Builds records from a JSON array of objects.
    pub fn many_from_json(json: serde_json::Value) -> Result<Vec<Self>, GridError> {
        match json {
            serde_json::Value::Array(items) => items.into_iter().map(Self::from_json).collect(),
            other => Err(GridError::Json {
                actual: json_type_name(&other),
            }),
        }
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    // =========================================================================
    // Typed getters
    //
    // None when the field is missing, null, or of another type.
    // =========================================================================

    /// Gets a string field value.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Gets an integer field value.
    pub fn get_int(&self, field: &str) -> Option<i64> {
        match self.fields.get(field) {
            Some(Value::Int(n)) => Some(*n),
            _ => None,
        }
    }

    /// Gets a float field value, widening integers.
    pub fn get_float(&self, field: &str) -> Option<f64> {
        match self.fields.get(field) {
            Some(Value::Float(n)) => Some(*n),
            Some(Value::Int(n)) => Some(*n as f64),
            _ => None,
        }
    }

    /// Gets a DateTime field value.
    pub fn get_datetime(&self, field: &str) -> Option<DateTime<Utc>> {
        match self.fields.get(field) {
            Some(Value::DateTime(dt)) => Some(*dt),
            _ => None,
        }
    }
}

impl RowData for Record {
    fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    fn children(&self, key: &str) -> Option<&[Self]> {
        self.fields.get(key).and_then(Value::as_records)
    }

    fn search_text(&self) -> String {
        // Sorted keys keep the serialization stable between calls.
        let ordered: BTreeMap<&String, &Value> = self.fields.iter().collect();
        serde_json::to_string(&ordered).unwrap_or_default()
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
