//! Storage backends: the persistence seam behind the generic store.
//!
//! Backends speak JSON row snapshots keyed by an entity's static descriptor.
//! The store layer owns all typed semantics (id rules, audit stamping, field
//! merging); a backend only moves rows.

pub mod memory;
pub mod postgres;

pub use memory::MemoryBackend;
pub use postgres::PostgresBackend;

use crate::error::StorageError;
use crate::record::EntityMeta;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Prepare storage for the given variants (DDL, table allocation). Called
    /// once at startup, before traffic is admitted.
    async fn prepare(&self, metas: &[&'static EntityMeta]) -> Result<(), StorageError>;

    async fn select_all(&self, meta: &'static EntityMeta) -> Result<Vec<Value>, StorageError>;

    async fn select_one(
        &self,
        meta: &'static EntityMeta,
        id: i64,
    ) -> Result<Option<Value>, StorageError>;

    /// Insert a row and assign its identifier. Returns the stored row.
    async fn insert(&self, meta: &'static EntityMeta, row: &Value) -> Result<Value, StorageError>;

    /// Replace the row with the given id. Returns `None` when no such row
    /// exists.
    async fn update(
        &self,
        meta: &'static EntityMeta,
        id: i64,
        row: &Value,
    ) -> Result<Option<Value>, StorageError>;

    /// Remove the row with the given id. Returns whether a row was removed.
    async fn delete(&self, meta: &'static EntityMeta, id: i64) -> Result<bool, StorageError>;

    async fn count(&self, meta: &'static EntityMeta) -> Result<u64, StorageError>;
}
