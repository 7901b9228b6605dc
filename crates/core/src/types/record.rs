//! JSON records stored in resource collections.
//!
//! A [`Record`] is a JSON object. The only field the store interprets is
//! `id`; everything else passes through untouched. Field presence checks
//! follow the loose truthiness rules the storefront clients were written
//! against: `null`, `false`, `0`, `""` and a missing key all count as absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::RecordId;

/// Name of the identifier field.
pub const ID_FIELD: &str = "id";

/// Errors raised while interpreting request bodies or stored records.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The value is not a JSON object.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// One or more required fields are absent.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A field that must be a string is some other type.
    #[error("field {0} must be a string")]
    NotAString(&'static str),

    /// A string field is not long enough.
    #[error("{field} must be longer than {min} characters")]
    TooShort {
        /// Field name.
        field: &'static str,
        /// Length the value must exceed.
        min: usize,
    },

    /// The `id` field holds something that cannot be an id.
    #[error("id must be a non-empty string or a number")]
    InvalidId,
}

/// A single JSON object in a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Convert a JSON value into a record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotAnObject`] for anything but a JSON object.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(RecordError::NotAnObject(type_name(&other))),
        }
    }

    /// The record's id, if it has a usable one.
    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.0.get(ID_FIELD).and_then(RecordId::from_value)
    }

    /// Whether the record carries an `id` key at all (even an unusable one).
    #[must_use]
    pub fn has_id_field(&self) -> bool {
        self.0.get(ID_FIELD).is_some_and(|v| !v.is_null())
    }

    /// Set the `id` field.
    pub fn set_id(&mut self, id: &RecordId) {
        self.0
            .insert(ID_FIELD.to_owned(), Value::String(id.as_str().to_owned()));
    }

    /// Remove the `id` field, returning it if it was usable.
    pub fn take_id(&mut self) -> Option<RecordId> {
        self.0
            .remove(ID_FIELD)
            .and_then(|v| RecordId::from_value(&v))
    }

    /// Rewrite a numeric id as a string.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidId`] when an `id` key is present but is
    /// neither a non-empty string nor a number.
    pub fn normalize_id(&mut self) -> Result<Option<RecordId>, RecordError> {
        if !self.has_id_field() {
            self.0.remove(ID_FIELD);
            return Ok(None);
        }
        let id = self.id().ok_or(RecordError::InvalidId)?;
        self.set_id(&id);
        Ok(Some(id))
    }

    /// The replacement stored by an update: this body, with `id` taken from
    /// the path and never from the body.
    #[must_use]
    pub fn with_id(mut self, id: &RecordId) -> Self {
        self.0.remove(ID_FIELD);
        self.set_id(id);
        self
    }

    /// Whether this record's id equals `id`.
    #[must_use]
    pub fn has_id(&self, id: &RecordId) -> bool {
        self.id().is_some_and(|own| own == *id)
    }

    /// Get a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a string field.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Insert a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a field.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Whether a field is present and truthy.
    #[must_use]
    pub fn is_present(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(is_truthy)
    }

    /// Names from `required` that are absent from this record.
    #[must_use]
    pub fn missing_fields(&self, required: &[&'static str]) -> Vec<&'static str> {
        required
            .iter()
            .copied()
            .filter(|field| !self.is_present(field))
            .collect()
    }

    /// Whether the field, rendered as a string, equals `expected`.
    ///
    /// Numbers compare by their decimal form, so `{"userId": 42}` matches
    /// `"42"`. A missing field never matches.
    #[must_use]
    pub fn field_equals(&self, key: &str, expected: &str) -> bool {
        self.0
            .get(key)
            .is_some_and(|value| display_value(value) == expected)
    }

    /// Borrow the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the record and return the underlying map.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Consume the record and return it as a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

/// Loose truthiness: `null`, `false`, `0` and `""` are falsy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a scalar the way a query string would carry it.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
