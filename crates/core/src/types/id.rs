//! Record identifiers.
//!
//! Every record in a collection carries an `id` field. Ids are opaque strings;
//! numeric ids found in older data files are accepted and normalised to their
//! decimal string form so that lookups compare one representation only.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a record within one collection.
///
/// Comparison is exact string equality. `"01"` and `"1"` are different ids.
///
/// ```
/// use sneako_core::RecordId;
/// use serde_json::json;
///
/// assert_eq!(RecordId::from_value(&json!("42")).unwrap().as_str(), "42");
/// assert_eq!(RecordId::from_value(&json!(42)).unwrap().as_str(), "42");
/// assert!(RecordId::from_value(&json!(null)).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create an id from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Read an id out of a JSON value.
    ///
    /// Strings are taken verbatim and numbers are rendered in decimal. Every
    /// other value (including an empty string) is not a usable id.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id as an integer, when it is written in canonical decimal form.
    ///
    /// Used by counters that need to know how far numbering has progressed.
    /// `"+5"` and `"007"` are ordinary string ids, not sequence numbers.
    #[must_use]
    pub fn as_sequence(&self) -> Option<u64> {
        self.0
            .parse::<u64>()
            .ok()
            .filter(|n| n.to_string() == self.0)
    }

    /// Consume the id and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        Self::String(id.0)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
