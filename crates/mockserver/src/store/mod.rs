//! File-backed resource store.
//!
//! # Data directory
//!
//! Every `<name>.json` file in the data directory is one resource. Files are
//! read once, when the store is opened; from then on the store holds the
//! authoritative copy and rewrites a resource's file in full after every
//! mutation.
//!
//! # Consistency
//!
//! Each resource sits behind its own mutex. A mutation builds the next state
//! of the collection, writes it to disk, and only then swaps it in, all
//! while holding the lock. A failed write leaves both the file and the
//! in-memory collection as they were, and a successful one is visible to the
//! next `load` on any thread.
//!
//! Operations on different resources are independent. Nothing here spans
//! two resources atomically.

mod collection;
pub mod ids;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use sneako_core::{Record, RecordError, RecordId, ResourceName, ResourceNameError};
use thiserror::Error;

pub use collection::Collection;
pub use ids::{IdAllocator, IdStrategy, LegacyIds, SequentialIds, UuidIds};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No collection with this name exists.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// No record with this id exists in the collection.
    #[error("{resource} record {id} not found")]
    NotFound {
        resource: ResourceName,
        id: RecordId,
    },

    /// A record with this id already exists in the collection.
    #[error("{resource} record {id} already exists")]
    DuplicateId {
        resource: ResourceName,
        id: RecordId,
    },

    /// The record itself is unusable (e.g. a malformed `id`).
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] RecordError),

    /// A resource name is not valid.
    #[error("invalid resource name: {0}")]
    InvalidName(#[from] ResourceNameError),

    /// A backing file exists but its contents are not a valid collection.
    #[error("data corruption in {}: {reason}", path.display())]
    DataCorruption { path: PathBuf, reason: String },

    /// Reading a backing file or the data directory failed.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a backing file failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialising a collection failed.
    #[error("failed to encode {resource}: {source}")]
    Encode {
        resource: ResourceName,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Whether this error means the backing file could not be written.
    #[must_use]
    pub const fn is_persistence_failure(&self) -> bool {
        matches!(self, Self::Write { .. } | Self::Encode { .. })
    }
}

/// Durable, named, ordered record collections.
#[derive(Debug)]
pub struct ResourceStore {
    dir: PathBuf,
    collections: BTreeMap<ResourceName, Mutex<Collection>>,
    ids: Box<dyn IdAllocator>,
}

impl ResourceStore {
    /// Open a data directory.
    ///
    /// Loads every `*.json` file in `dir`. Each name in `required` that has
    /// no file yet gets an empty collection, written out immediately. The
    /// directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Read` if the directory or a file cannot be read,
    /// `StoreError::DataCorruption` if a file is not a valid collection, and
    /// `StoreError::Write` if a required collection cannot be created.
    pub fn open(
        dir: impl Into<PathBuf>,
        ids: Box<dyn IdAllocator>,
        required: &[&str],
    ) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Write {
            path: dir.clone(),
            source,
        })?;

        let mut collections = BTreeMap::new();
        let entries = fs::read_dir(&dir).map_err(|source| StoreError::Read {
            path: dir.clone(),
            source,
        })?;
        for entry in entries {
            let path = entry
                .map_err(|source| StoreError::Read {
                    path: dir.clone(),
                    source,
                })?
                .path();
            let Some(name) = resource_name_for(&path) else {
                continue;
            };
            let collection = collection::read_file(&path, &name)?;
            tracing::debug!(resource = %name, records = collection.len(), "loaded collection");
            collections.insert(name, Mutex::new(collection));
        }

        let mut store = Self {
            dir,
            collections,
            ids,
        };
        for name in required {
            store.ensure(name)?;
        }
        Ok(store)
    }

    /// Create an empty collection (and its file) unless it already exists.
    fn ensure(&mut self, name: &str) -> Result<(), StoreError> {
        let name = ResourceName::parse(name)?;
        if self.collections.contains_key(&name) {
            return Ok(());
        }
        let collection = Collection::default();
        self.persist(&name, &collection)?;
        tracing::info!(resource = %name, "created empty collection");
        self.collections.insert(name, Mutex::new(collection));
        Ok(())
    }

    /// The data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a collection with this name exists.
    #[must_use]
    pub fn contains(&self, resource: &str) -> bool {
        self.collections.contains_key(resource)
    }

    /// Names of all collections, sorted.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceName> {
        self.collections.keys()
    }

    /// Current records of a resource. Unknown resources are empty.
    #[must_use]
    pub fn load(&self, resource: &str) -> Vec<Record> {
        self.lock(resource)
            .map(|(_, collection)| collection.records().to_vec())
            .unwrap_or_default()
    }

    /// A single record by id.
    #[must_use]
    pub fn find_by_id(&self, resource: &str, id: &RecordId) -> Option<Record> {
        let (_, collection) = self.lock(resource).ok()?;
        collection.get(id).cloned()
    }

    /// Append a record, allocating an id if it has none.
    ///
    /// # Errors
    ///
    /// See [`ResourceStore::append_with`].
    pub fn append(&self, resource: &str, record: Record) -> Result<Record, StoreError> {
        self.append_with(resource, |_| Ok(record))
    }

    /// Append the record produced by `build`.
    ///
    /// `build` sees the current records and runs under the resource's lock,
    /// so a check it makes still holds when the record is written.
    ///
    /// # Errors
    ///
    /// - whatever `build` returns
    /// - `StoreError::UnknownResource` if the resource does not exist
    /// - `StoreError::InvalidRecord` if the record's `id` is unusable
    /// - `StoreError::DuplicateId` if the id is already taken
    /// - `StoreError::Write` / `StoreError::Encode` if persisting fails, in
    ///   which case the record is not added
    pub fn append_with<F, E>(&self, resource: &str, build: F) -> Result<Record, E>
    where
        F: FnOnce(&[Record]) -> Result<Record, E>,
        E: From<StoreError>,
    {
        let (name, mut collection) = self.lock(resource)?;
        let mut record = build(collection.records())?;

        let id = match record.normalize_id().map_err(StoreError::from)? {
            Some(id) => id,
            None => {
                let id = self.ids.next_id(name, &collection);
                record.set_id(&id);
                id
            }
        };

        if collection.position(&id).is_some() {
            return Err(StoreError::DuplicateId {
                resource: name.clone(),
                id,
            }
            .into());
        }

        let mut next = collection.clone();
        next.push(record.clone());
        self.commit(name, &mut collection, next)?;

        tracing::info!(resource = %name, id = %id, "record appended");
        Ok(record)
    }

    /// Overwrite the record with this id, keeping its position.
    ///
    /// The stored record is `record` with its `id` forced to `id`.
    ///
    /// # Errors
    ///
    /// `StoreError::UnknownResource`, `StoreError::NotFound`, or a
    /// persistence error (the old record is kept).
    pub fn replace_by_id(
        &self,
        resource: &str,
        id: &RecordId,
        record: Record,
    ) -> Result<Record, StoreError> {
        let (name, mut collection) = self.lock(resource)?;
        let record = record.with_id(id);

        let mut next = collection.clone();
        next.replace(id, record.clone())
            .ok_or_else(|| StoreError::NotFound {
                resource: name.clone(),
                id: id.clone(),
            })?;
        self.commit(name, &mut collection, next)?;

        tracing::info!(resource = %name, id = %id, "record replaced");
        Ok(record)
    }

    /// Delete the record with this id.
    ///
    /// # Errors
    ///
    /// `StoreError::UnknownResource`, `StoreError::NotFound`, or a
    /// persistence error (the record is kept).
    pub fn remove_by_id(&self, resource: &str, id: &RecordId) -> Result<Record, StoreError> {
        let (name, mut collection) = self.lock(resource)?;

        let mut next = collection.clone();
        let removed = next.remove(id).ok_or_else(|| StoreError::NotFound {
            resource: name.clone(),
            id: id.clone(),
        })?;
        self.commit(name, &mut collection, next)?;

        tracing::info!(resource = %name, id = %id, "record removed");
        Ok(removed)
    }

    fn lock(
        &self,
        resource: &str,
    ) -> Result<(&ResourceName, MutexGuard<'_, Collection>), StoreError> {
        let (name, mutex) = self
            .collections
            .get_key_value(resource)
            .ok_or_else(|| StoreError::UnknownResource(resource.to_owned()))?;
        // A panic while locked cannot leave a half-applied mutation behind:
        // the collection is only ever swapped whole, after the file write.
        let guard = mutex.lock().unwrap_or_else(PoisonError::into_inner);
        Ok((name, guard))
    }

    /// Persist `next`, then make it the current state.
    fn commit(
        &self,
        name: &ResourceName,
        current: &mut Collection,
        next: Collection,
    ) -> Result<(), StoreError> {
        self.persist(name, &next)?;
        *current = next;
        Ok(())
    }

    fn persist(&self, name: &ResourceName, collection: &Collection) -> Result<(), StoreError> {
        let bytes = collection
            .encode(name)
            .map_err(|source| StoreError::Encode {
                resource: name.clone(),
                source,
            })?;
        collection::write_file(&self.dir.join(name.file_name()), &bytes)
    }
}

/// The resource a data-directory entry holds, if it is a collection file.
fn resource_name_for(path: &Path) -> Option<ResourceName> {
    if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    match ResourceName::parse(stem) {
        Ok(name) => Some(name),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping data file");
            None
        }
    }
}
