//! Id allocation strategies.
//!
//! The store asks its allocator for an id whenever a record arrives without
//! one. The allocator runs while the collection's lock is held, so it sees
//! the collection exactly as the new record will.

use std::fmt;
use std::str::FromStr;

use sneako_core::{RecordId, ResourceName};
use uuid::Uuid;

use super::collection::Collection;

/// Produces fresh ids for new records.
pub trait IdAllocator: Send + Sync + fmt::Debug {
    /// The id for the next record appended to `collection`.
    fn next_id(&self, resource: &ResourceName, collection: &Collection) -> RecordId;
}

/// Monotonic counter, persisted with the collection.
///
/// Yields `"1"`, `"2"`, ... for a fresh collection and never hands out an id
/// again after the record holding it is deleted.
///
/// A client may store a record under an id near `u64::MAX`, which leaves the
/// counter with nowhere to go. The allocator then wraps around and takes the
/// lowest number not held by a record, so allocation always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialIds;

impl IdAllocator for SequentialIds {
    fn next_id(&self, _resource: &ResourceName, collection: &Collection) -> RecordId {
        let start = collection.last_id().checked_add(1).unwrap_or(1);
        (start..=u64::MAX)
            .chain(1..start)
            .map(RecordId::from)
            .find(|id| collection.position(id).is_none())
            .unwrap_or_else(|| RecordId::new(Uuid::new_v4().to_string()))
    }
}

/// Collection length plus one.
///
/// Matches the numbering older fixtures were generated with. After a
/// deletion this can produce an id that is still in use; the store rejects
/// such an append instead of storing a duplicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyIds;

impl IdAllocator for LegacyIds {
    fn next_id(&self, _resource: &ResourceName, collection: &Collection) -> RecordId {
        RecordId::from(collection.len() as u64 + 1)
    }
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdAllocator for UuidIds {
    fn next_id(&self, _resource: &ResourceName, _collection: &Collection) -> RecordId {
        RecordId::new(Uuid::new_v4().to_string())
    }
}

/// Which allocator to use, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// [`SequentialIds`]
    #[default]
    Sequential,
    /// [`LegacyIds`]
    Legacy,
    /// [`UuidIds`]
    Uuid,
}

impl IdStrategy {
    /// Build the allocator for this strategy.
    #[must_use]
    pub fn allocator(self) -> Box<dyn IdAllocator> {
        match self {
            Self::Sequential => Box::new(SequentialIds),
            Self::Legacy => Box::new(LegacyIds),
            Self::Uuid => Box::new(UuidIds),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "legacy" => Ok(Self::Legacy),
            "uuid" => Ok(Self::Uuid),
            other => Err(format!(
                "unknown id strategy '{other}' (expected sequential, legacy or uuid)"
            )),
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sequential => "sequential",
            Self::Legacy => "legacy",
            Self::Uuid => "uuid",
        })
    }
}
