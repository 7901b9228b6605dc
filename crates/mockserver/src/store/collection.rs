//! In-memory collections and their backing files.
//!
//! # File Format
//!
//! One JSON document per resource, keyed by the resource name:
//!
//! ```text
//! {
//!   "products": [ { "id": "1", ... }, ... ],
//!   "_meta": { "lastId": 7 }
//! }
//! ```
//!
//! `_meta.lastId` is the highest sequential id ever handed out. Files
//! without it (or bare arrays) are accepted; the counter is then seeded from
//! the largest numeric id present.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use sneako_core::{Record, RecordId, ResourceName};

use super::StoreError;

const META_KEY: &str = "_meta";
const LAST_ID_KEY: &str = "lastId";

/// The records of one resource, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    records: Vec<Record>,
    last_id: u64,
}

impl Collection {
    /// Build a collection from records and a counter value.
    ///
    /// The counter is raised to cover every numeric id in `records`.
    #[must_use]
    pub fn from_parts(records: Vec<Record>, last_id: u64) -> Self {
        let mut collection = Self {
            records: Vec::with_capacity(records.len()),
            last_id,
        };
        for record in records {
            collection.push(record);
        }
        collection
    }

    /// The records, in order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest sequential id seen or allocated.
    #[must_use]
    pub const fn last_id(&self) -> u64 {
        self.last_id
    }

    /// Position of the record with this id.
    #[must_use]
    pub fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.has_id(id))
    }

    /// Record with this id.
    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.has_id(id))
    }

    /// Append a record that already carries its id.
    pub(crate) fn push(&mut self, record: Record) {
        if let Some(n) = record.id().as_ref().and_then(RecordId::as_sequence) {
            self.last_id = self.last_id.max(n);
        }
        self.records.push(record);
    }

    /// Overwrite the record with this id in place.
    pub(crate) fn replace(&mut self, id: &RecordId, record: Record) -> Option<()> {
        let position = self.position(id)?;
        let slot = self.records.get_mut(position)?;
        *slot = record;
        Some(())
    }

    /// Remove the record with this id.
    pub(crate) fn remove(&mut self, id: &RecordId) -> Option<Record> {
        let position = self.position(id)?;
        Some(self.records.remove(position))
    }

    /// Parse a backing file's contents.
    ///
    /// Numeric ids are normalised to strings. Records without a usable id
    /// and duplicate ids are rejected.
    pub(crate) fn decode(resource: &ResourceName, bytes: &[u8]) -> Result<Self, String> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let document: Value =
            serde_json::from_slice(bytes).map_err(|e| format!("invalid JSON: {e}"))?;

        let (items, last_id) = match document {
            Value::Array(items) => (items, 0),
            Value::Object(mut map) => {
                let last_id = map
                    .get(META_KEY)
                    .and_then(|meta| meta.get(LAST_ID_KEY))
                    .and_then(Value::as_u64)
                    .unwrap_or(0);
                let items = match map.remove(resource.as_str()) {
                    Some(Value::Array(items)) => items,
                    Some(Value::Null) | None => Vec::new(),
                    Some(_) => return Err(format!("\"{resource}\" must be an array")),
                };
                (items, last_id)
            }
            _ => return Err("expected an object or an array".to_owned()),
        };

        let mut seen = HashSet::with_capacity(items.len());
        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let mut record =
                Record::from_value(item).map_err(|e| format!("record {index}: {e}"))?;
            let id = record
                .normalize_id()
                .map_err(|e| format!("record {index}: {e}"))?
                .ok_or_else(|| format!("record {index} has no id"))?;
            if !seen.insert(id.clone()) {
                return Err(format!("duplicate id {id}"));
            }
            records.push(record);
        }

        Ok(Self::from_parts(records, last_id))
    }

    /// Serialise the whole collection as a backing file.
    pub(crate) fn encode(&self, resource: &ResourceName) -> Result<Vec<u8>, serde_json::Error> {
        let mut document = Map::new();
        document.insert(
            resource.as_str().to_owned(),
            Value::Array(self.records.iter().cloned().map(Record::into_value).collect()),
        );
        let mut meta = Map::new();
        meta.insert(LAST_ID_KEY.to_owned(), Value::from(self.last_id));
        document.insert(META_KEY.to_owned(), Value::Object(meta));

        let mut bytes = serde_json::to_vec_pretty(&Value::Object(document))?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Read and decode a backing file.
pub(crate) fn read_file(path: &Path, resource: &ResourceName) -> Result<Collection, StoreError> {
    let bytes = fs::read(path).map_err(|source| StoreError::Read {
        path: path.to_owned(),
        source,
    })?;
    Collection::decode(resource, &bytes).map_err(|reason| StoreError::DataCorruption {
        path: path.to_owned(),
        reason,
    })
}

/// Replace a file's contents: write a sibling temp file, then rename it over
/// the target. A failure at any point leaves the old file as it was.
pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp_path = temp_path(path);

    let result = fs::write(&tmp_path, bytes).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(source) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Write {
            path: path.to_owned(),
            source,
        });
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
