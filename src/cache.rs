//! Read/write-through record cache.
//!
//! Entries are JSON snapshots of persisted records, keyed by
//! (entity name, id). Keying includes the entity name so two variants sharing
//! an id value can never collide.

use crate::record::Record;
use dashmap::DashMap;
use serde_json::Value;

type CacheKey = (&'static str, i64);

/// Concurrent snapshot cache shared by all record variants. The cache is
/// advisory: a miss or a dropped entry only costs a backend read.
#[derive(Default)]
pub struct RecordCache {
    entries: DashMap<CacheKey, Value>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: Record>(&self, id: i64) -> Option<T> {
        let key = (T::META.name, id);
        let snapshot = self.entries.get(&key)?.value().clone();
        match serde_json::from_value(snapshot) {
            Ok(rec) => Some(rec),
            Err(_) => {
                // Snapshot no longer matches the record shape; drop it.
                self.entries.remove(&key);
                None
            }
        }
    }

    /// Insert or replace the snapshot for a persisted record. Records without
    /// an identifier are not cacheable and are skipped.
    pub fn put<T: Record>(&self, rec: &T) {
        let Some(id) = rec.id() else { return };
        match serde_json::to_value(rec) {
            Ok(snapshot) => {
                self.entries.insert((T::META.name, id), snapshot);
            }
            Err(err) => {
                tracing::warn!(entity = T::META.name, id, %err, "cache put skipped");
            }
        }
    }

    pub fn remove(&self, entity: &'static str, id: i64) {
        self.entries.remove(&(entity, id));
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
